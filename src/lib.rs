//! depgroup - grouped dependency update compiler
//!
//! This library compiles named groups of dependencies into one cumulative
//! change per group:
//! - npm (package.json, including workspaces)
//! - Cargo (Cargo.toml, including workspace members)
//!
//! A run-wide registry of handled dependencies guarantees that a dependency
//! is resolved at most once per run, even when several groups list it.

pub mod cli;
pub mod config;
pub mod domain;
pub mod ecosystem;
pub mod error;
pub mod error_handler;
pub mod group;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod update;
pub mod workspace;
