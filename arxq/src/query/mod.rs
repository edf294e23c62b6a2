//! Search DSL compilation for the arXiv API.
//!
//! The pipeline is three pure stages: tokenizer → parser → transformer.
//! Each stage consumes the previous stage's output; the first error wins
//! and later stages are skipped.

pub mod ast;
pub mod fields;
pub mod options;
pub mod parser;
pub mod transform;

pub use ast::{Expr, TermExpr};
pub use fields::{Field, SortCriterion, SortOrder};
pub use options::SearchOptions;
pub use parser::{Token, TokenKind};
pub use transform::CompiledQuery;

use serde::Serialize;

use crate::config::CompilerConfig;
use crate::error::ParseError;
use parser::tokenizer::Tokenizer;
use transform::Transformer;

/// Successful compilation. The token vector and AST are populated only
/// when the compiler was built with debug mode on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub compiled: CompiledQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast: Option<Expr>,
}

/// Single entry point for query compilation. Stateless apart from its
/// configuration; safe to share across threads.
pub struct QueryCompiler {
    debug: bool,
    max_query_len: usize,
    transformer: Transformer,
}

impl QueryCompiler {
    pub fn new() -> Self {
        Self::from_config(&CompilerConfig::default())
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            debug: config.debug,
            max_query_len: config.max_query_len,
            transformer: Transformer::new(config.timezone_offset_hours),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Compile a query string, or report the first problem found.
    pub fn parse(&self, input: &str) -> Result<ParsedQuery, ParseError> {
        if input.len() > self.max_query_len {
            return Err(ParseError::input(format!(
                "Query exceeds maximum length of {} bytes",
                self.max_query_len
            )));
        }

        let tokens = Tokenizer::new(input).tokenize()?;
        tracing::debug!(count = tokens.len(), "tokenized query");

        let debug_tokens = self.debug.then(|| tokens.clone());
        let (expr, options) = parser::grammar::parse(tokens)?;

        let compiled = self.transformer.transform(expr.as_ref(), &options)?;

        Ok(ParsedQuery {
            compiled,
            tokens: debug_tokens,
            ast: if self.debug { expr } else { None },
        })
    }
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile with default configuration. Convenience wrapper for hosts that
/// only want the compiled query.
pub fn parse(input: &str) -> Result<CompiledQuery, ParseError> {
    QueryCompiler::new().parse(input).map(|p| p.compiled)
}

#[cfg(test)]
mod facade_tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn test_parse_success() {
        let compiled = parse("quantum @hinton").unwrap();
        assert_eq!(compiled.query, "ti:quantum AND au:hinton");
        assert_eq!(compiled.max_results, 10);
    }

    #[test]
    fn test_debug_mode_returns_intermediates() {
        let compiler = QueryCompiler::new().with_debug(true);
        let parsed = compiler.parse("quantum").unwrap();
        assert!(parsed.tokens.is_some());
        assert!(parsed.ast.is_some());
    }

    #[test]
    fn test_default_omits_intermediates() {
        let parsed = QueryCompiler::new().parse("quantum").unwrap();
        assert!(parsed.tokens.is_none());
        assert!(parsed.ast.is_none());
    }

    #[test]
    fn test_stage_tagging() {
        assert_eq!(parse("\"open").unwrap_err().stage, Stage::Lex);
        assert_eq!(parse("(a").unwrap_err().stage, Stage::Parse);
        assert_eq!(parse("foo:bar").unwrap_err().stage, Stage::Transform);
    }

    #[test]
    fn test_position_preserved() {
        let err = parse("quantum (").unwrap_err();
        assert_eq!(err.position, Some(8));
    }

    #[test]
    fn test_input_length_bound() {
        let long = "a ".repeat(3000);
        let err = parse(&long).unwrap_err();
        assert_eq!(err.stage, Stage::Input);
        assert!(err.message.contains("maximum length"));
    }

    #[test]
    fn test_input_at_bound_is_accepted() {
        // 4096 bytes exactly: 2047 two-byte pairs ("a ") plus "aq"
        let input = format!("{}aq", "a ".repeat(2047));
        assert_eq!(input.len(), 4096);
        assert!(parse(&input).is_ok());
    }
}
