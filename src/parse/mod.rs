pub mod ast;
pub(crate) mod dice;
mod error;
pub mod lexer;
mod parser;
pub mod visit;

pub use error::{ParseError, ParseErrorKind};
pub use parser::{Parser, MAX_NESTING};

/// Parse a script. A pure function of `source`.
pub fn parse(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source).parse()
}
