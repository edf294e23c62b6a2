pub mod config;
pub mod error;
pub mod query;

pub use config::CompilerConfig;
pub use error::{ParseError, Stage};
pub use query::{parse, CompiledQuery, ParsedQuery, QueryCompiler};
