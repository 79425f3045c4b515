//! # sa-cli — Shadow Annotations Command-Line Interface
//!
//! Provides the `shadow-annotate` binary for working with data documents
//! and shadow trees stored on disk.
//!
//! ## Subcommands
//!
//! - `shadow-annotate validate`: full validation pass, findings report.
//! - `shadow-annotate convert`: converter pass in either direction.
//! - `shadow-annotate check-shadow`: parse, check and lint a shadow tree.
//!
//! ```bash
//! shadow-annotate validate --data demos/person/user.json \
//!     --shadow demos/person/user.shadow.json --key user \
//!     --cities demos/person/cities.yaml
//! shadow-annotate convert --data user.json --shadow user.shadow.json --direction to
//! shadow-annotate check-shadow --shadow user.shadow.json --data user.json --strict
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; every subcommand is a
//!   `run_*(&args, config) -> Result<u8>` function returning the exit code.
//! - Engine logic stays in `sa-engine` and `sa-rules`.

pub mod check;
pub mod convert;
pub mod document;
pub mod validate;
