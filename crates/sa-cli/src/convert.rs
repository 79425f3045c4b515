//! # Convert Subcommand
//!
//! Runs every converter declared in a shadow tree over a data document and
//! writes the result. `to` produces the rich form (decimals serialize as
//! strings), `from` the plain form (decimals become numbers).

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};

use sa_core::FieldValue;
use sa_engine::Direction;

use crate::document::{build_session, load_config, load_data, load_shadow, write_data};

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertDirection {
    /// Raw values to their rich form.
    To,
    /// Rich values back to their raw form.
    From,
}

impl From<ConvertDirection> for Direction {
    fn from(direction: ConvertDirection) -> Self {
        match direction {
            ConvertDirection::To => Direction::To,
            ConvertDirection::From => Direction::From,
        }
    }
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Data document (JSON or YAML).
    #[arg(long)]
    pub data: PathBuf,

    /// Shadow tree document (JSON or YAML).
    #[arg(long)]
    pub shadow: PathBuf,

    /// Conversion direction.
    #[arg(long, value_enum, default_value = "to")]
    pub direction: ConvertDirection,

    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Convert a data document in the requested direction.
pub fn convert_document(args: &ConvertArgs, config: Option<&Path>) -> Result<FieldValue> {
    let config = load_config(config)?;
    let shadow = load_shadow(&args.shadow, &config.syntax)?;
    let data = load_data(&args.data)?;

    let mut session = build_session(config, None)?;
    let mut obj = session.register("data", data, shadow)?;
    session.convert_tree(&mut obj, args.direction.into())?;
    Ok(obj.into_inner())
}

/// Run the `convert` subcommand.
pub fn run_convert(args: &ConvertArgs, config: Option<&Path>) -> Result<u8> {
    let converted = convert_document(args, config)?;
    write_data(&converted, args.out.as_deref())?;
    if let Some(out) = &args.out {
        tracing::info!(out = %out.display(), "converted document written");
    }
    Ok(0)
}
