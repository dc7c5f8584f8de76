//! CLI argument parsing module for depgroup

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a release-age string: Nd (days), Nw (weeks), Nm (months)
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit_secs) = if let Some(n) = s.strip_suffix('d') {
        (n, 24 * 60 * 60)
    } else if let Some(n) = s.strip_suffix('w') {
        (n, 7 * 24 * 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        // months are 30 days
        (n, 30 * 24 * 60 * 60)
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    Ok(Duration::from_secs(num * unit_secs))
}

/// Parse a time budget: Ns (seconds), Nm (minutes), Nh (hours)
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timeout string".to_string());
    }

    let (num_str, unit_secs) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else {
        return Err(format!("invalid timeout format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in timeout: {}", num_str))?;
    if num == 0 {
        return Err("timeout must be greater than zero".to_string());
    }

    Ok(Duration::from_secs(num * unit_secs))
}

/// Grouped dependency updater
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depgroup",
    version,
    about = "Compile grouped dependency updates for npm and Cargo projects"
)]
pub struct CliArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Configuration file (default: <path>/depgroup.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    // General options
    /// Dry run mode - show what would be updated without writing files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Group selection
    /// Compile only the named group (can be specified multiple times)
    #[arg(short, long = "group", action = ArgAction::Append)]
    pub groups: Vec<String>,

    // Update policy
    /// Only update to versions released at least this long ago (e.g., 2w, 10d, 1m)
    #[arg(long, value_parser = parse_duration)]
    pub cooldown: Option<Duration>,

    /// Stop starting new dependencies after this long (e.g., 90s, 15m, 1h)
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Drop a group change if any updated dependency lacks its previous version
    #[arg(long)]
    pub validate_provenance: bool,

    /// Use a scratch working directory for each group pass
    #[arg(long)]
    pub workspace: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Configuration file path, defaulting to `depgroup.toml` in the project
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.path.join(crate::config::CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["depgroup"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(args.config.is_none());
        assert!(!args.dry_run);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.groups.is_empty());
        assert!(args.cooldown.is_none());
        assert!(args.timeout.is_none());
        assert!(!args.validate_provenance);
        assert!(!args.workspace);
        assert!(!args.json);
    }

    #[test]
    fn test_path_argument() {
        let args = CliArgs::parse_from(["depgroup", "/some/path"]);
        assert_eq!(args.path, PathBuf::from("/some/path"));
        assert_eq!(args.config_path(), PathBuf::from("/some/path/depgroup.toml"));
    }

    #[test]
    fn test_explicit_config_path() {
        let args = CliArgs::parse_from(["depgroup", "--config", "ci/groups.toml"]);
        assert_eq!(args.config_path(), PathBuf::from("ci/groups.toml"));
    }

    #[test]
    fn test_dry_run_flags() {
        assert!(CliArgs::parse_from(["depgroup", "-n"]).dry_run);
        assert!(CliArgs::parse_from(["depgroup", "--dry-run"]).dry_run);
    }

    #[test]
    fn test_quiet_flags() {
        assert!(CliArgs::parse_from(["depgroup", "-q"]).quiet);
        assert!(CliArgs::parse_from(["depgroup", "--quiet"]).quiet);
    }

    #[test]
    fn test_group_multiple() {
        let args = CliArgs::parse_from(["depgroup", "--group", "serde", "-g", "tokio"]);
        assert_eq!(args.groups, vec!["serde", "tokio"]);
    }

    #[test]
    fn test_cooldown_flag() {
        let args = CliArgs::parse_from(["depgroup", "--cooldown", "2w"]);
        assert_eq!(args.cooldown, Some(Duration::from_secs(14 * 24 * 60 * 60)));
    }

    #[test]
    fn test_timeout_flag() {
        let args = CliArgs::parse_from(["depgroup", "--timeout", "15m"]);
        assert_eq!(args.timeout, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_invalid_cooldown_rejected() {
        assert!(CliArgs::try_parse_from(["depgroup", "--cooldown", "soon"]).is_err());
        assert!(CliArgs::try_parse_from(["depgroup", "--timeout", "0s"]).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10d"), Ok(Duration::from_secs(864_000)));
        assert_eq!(
            parse_duration("1m"),
            Ok(Duration::from_secs(30 * 24 * 60 * 60))
        );
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("xd").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_timeout("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_timeout("1d").is_err());
        assert!(parse_timeout("").is_err());
    }

    #[test]
    fn test_feature_flags() {
        let args =
            CliArgs::parse_from(["depgroup", "--validate-provenance", "--workspace", "--json"]);
        assert!(args.validate_provenance);
        assert!(args.workspace);
        assert!(args.json);
    }
}
