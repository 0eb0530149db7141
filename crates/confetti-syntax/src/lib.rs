//! # Confetti Syntax
//!
//! Tokenizer, parser and directive tree for the Confetti configuration language.
//!
//! ## Overview
//!
//! - **Lexer**: Pulls classified tokens out of UTF-8 text one at a time
//! - **Parser**: Builds a directive tree with one token of lookahead and an explicit block stack
//! - **AST**: [`ConfigurationUnit`] and [`Directive`], plus the canonical renderer
//! - **Error Handling**: Every failure carries an [`ErrorKind`] and a source [`Span`]
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (next_token, on demand)
//!     ↓
//! Parser (parse)
//!     ↓
//! ConfigurationUnit
//!     ↓
//! render()  →  <arg> <arg> [ ... ]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use confetti_syntax::parse;
//!
//! let source = r#"
//!     server {
//!         listen 80
//!         root "/var/www"
//!     }
//! "#;
//!
//! let unit = parse(source).expect("Parsing failed");
//!
//! assert_eq!(unit.len(), 1);
//! assert_eq!(
//!     unit.render(),
//!     "<server> [\n    <listen> <80>\n    <root> </var/www>\n]\n"
//! );
//! ```
//!
//! ## Grammar Overview
//!
//! ```text
//! directive-list:
//!   { newline | directive }            ; ends at EOF, or at '}' inside a block
//!
//! directive:
//!   argument+ ( newline* '{' directive-list '}' ';'?
//!             | newline | ';' | <before '}'> | <before EOF> )
//!
//! argument:
//!   - unquoted    (key, /var/www, a\;b)
//!   - quoted      ("hello world")
//!   - triple      ("""spans
//!                    lines""")
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use confetti_syntax::{parse, ErrorKind};
//!
//! let err = parse("server { listen 80").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnmatchedBrace);
//! println!("line {}, column {}: {}", err.line(), err.column(), err);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod unicode;

pub use ast::{ConfigurationUnit, Directive};
pub use error::{ErrorKind, LexError, ParseError, Span};
pub use lexer::{Lexer, SpannedToken, Token, tokenize};
pub use parser::{Parser, parse, parse_bytes};
pub use unicode::split_lines;
