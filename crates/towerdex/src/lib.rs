//! # Towerdex
//!
//! Command-line companion for a tower-defense game catalog: upgrade cards,
//! gear chips, turrets, server boosters, user reports and the feature board.
//!
//! The crate is the presentation layer over two library crates:
//! `towerdex-catalog` (records, caching, mutations, auth) and
//! `towerdex-query` (filtering, search, sorting, grouping).
//!
//! - [`screens`]: per-screen filter state turned into queries
//! - [`commands`]: [`App`], executing parsed commands against the catalog
//! - [`api`]: the read-only turret API router
//! - [`debounce`]: quiet-interval search input
//! - [`output`], [`serialize`], [`table`]: text, JSON, YAML and CSV output
//! - [`config`], [`logging`]: YAML configuration and tracing setup

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod logging;
pub mod output;
pub mod screens;
pub mod serialize;
pub mod table;

pub use api::{Api, ApiError, ApiResponse};
pub use cli::{Cli, Command};
pub use commands::App;
pub use config::{Config, ConfigError};
pub use debounce::SearchDebouncer;
pub use output::{OutputDestination, OutputMode};
