//! # CLI Module
//!
//! Command-line front end of the generator, shipped as the `protoroot-gen`
//! binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Derive the schema described by a manifest and write it:
//!
//! ```bash
//! protoroot-gen generate --manifest widgets.yaml --out proto
//! ```
//!
//! Options:
//! - `--manifest <FILE>` - service manifest, YAML or JSON (required)
//! - `--config <FILE>` - generator config, YAML, TOML or JSON
//! - `--out <DIR>` - output directory (default `proto`)
//! - `--layout <LAYOUT>` - `name-first` or `type-first`
//! - `--dry-run` - print the schema instead of writing it
//! - `--compile` - run the configured schema compiler on the written file
//!
//! ### `describe`
//!
//! Print the resolved handlers and every discovered record as JSON:
//!
//! ```bash
//! protoroot-gen describe --manifest widgets.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use protoroot::cli::{run, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run(cli, &mut std::io::stdout())?;
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, Layout};
