use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::query::parser::{LexError, SyntaxError};
use crate::query::transform::TransformError;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Input rejected before tokenization (length bound)
    Input,
    Lex,
    Parse,
    Transform,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
            Stage::Transform => write!(f, "transform"),
        }
    }
}

/// Uniform error shape across the whole pipeline. The message is fit for
/// direct display in chat; the position is a zero-based column when the
/// offending token has one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ParseError {
    pub stage: Stage,
    pub position: Option<usize>,
    pub message: String,
}

impl ParseError {
    pub fn input(message: impl Into<String>) -> Self {
        ParseError {
            stage: Stage::Input,
            position: None,
            message: message.into(),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            stage: Stage::Lex,
            position: Some(err.position()),
            message: err.to_string(),
        }
    }
}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError {
            stage: Stage::Parse,
            position: err.position(),
            message: err.to_string(),
        }
    }
}

impl From<TransformError> for ParseError {
    fn from(err: TransformError) -> Self {
        ParseError {
            stage: Stage::Transform,
            position: None,
            message: err.to_string(),
        }
    }
}
