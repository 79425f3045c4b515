//! Errors raised while building the rule set. Rules themselves report
//! through findings or [`sa_core::EngineError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    /// A built-in pattern failed to compile.
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}
