//! # Confetti
//!
//! Reader for the Confetti configuration language: turns text into a tree of
//! directives and renders that tree back in canonical form.
//!
//! ```rust
//! use confetti::prelude::*;
//!
//! let unit = parse("server { listen 80 };").unwrap();
//! assert_eq!(unit.directives[0].name(), "server");
//! ```

pub use confetti_syntax::{
    ConfigurationUnit, Directive, ErrorKind, LexError, Lexer, ParseError, Span, SpannedToken,
    Token, parse, parse_bytes, split_lines, tokenize,
};

pub mod prelude {
    pub use crate::{parse, parse_bytes};
    pub use crate::{ConfigurationUnit, Directive, ErrorKind, ParseError};
}
