//! Directive and block parsing methods for [`Parser`].
//!
//! Blocks are tracked on an explicit stack rather than the call stack, so
//! nesting depth is bounded only by memory.

use super::Parser;
use crate::ast::Directive;
use crate::error::{ParseError, Span};
use crate::lexer::Token;
use smallvec::SmallVec;
use tracing::trace;

type Result<T> = std::result::Result<T, ParseError>;

type Arguments = SmallVec<[String; 4]>;

/// A block whose `{` has been consumed but whose `}` has not been seen yet.
struct OpenBlock {
    arguments: Arguments,
    /// Directives preceding this one in the enclosing list.
    siblings: Vec<Directive>,
    open: Span,
}

/// What follows a directive's arguments.
enum Tail {
    Leaf,
    Block(Span),
}

impl Parser<'_> {
    /// Parses directives until end of input. Every `{` pushes an `OpenBlock`
    /// and every `}` pops one, attaching the finished children to it.
    pub(super) fn parse_directives(&mut self) -> Result<Vec<Directive>> {
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut current: Vec<Directive> = Vec::with_capacity(8);

        loop {
            match self.peek() {
                Token::Newline => {
                    self.advance()?;
                }
                Token::Eof => {
                    if let Some(block) = stack.last() {
                        return Err(ParseError::UnmatchedBrace { span: block.open });
                    }
                    return Ok(current);
                }
                Token::RightBrace => {
                    let Some(block) = stack.pop() else {
                        return Err(ParseError::UnmatchedBrace { span: self.peek_span() });
                    };
                    self.advance()?;

                    let children = std::mem::replace(&mut current, block.siblings);
                    let directive = Directive { arguments: block.arguments, subdirectives: children };
                    trace!(name = directive.name(), children = directive.subdirectives.len(), "block directive");
                    current.push(directive);

                    if matches!(self.peek(), Token::Semicolon) {
                        self.advance()?;
                    }
                }
                _ => {
                    let arguments = self.parse_arguments()?;

                    if arguments.is_empty() {
                        return Err(ParseError::MissingArguments { span: self.peek_span() });
                    }

                    match self.parse_tail()? {
                        Tail::Block(open) => {
                            let siblings = std::mem::take(&mut current);
                            stack.push(OpenBlock { arguments, siblings, open });
                        }
                        Tail::Leaf => {
                            let directive = Directive { arguments, subdirectives: Vec::new() };
                            trace!(name = directive.name(), "directive");
                            current.push(directive);
                        }
                    }
                }
            }
        }
    }

    /// Consumes whatever ends a directive, or the `{` that opens its block.
    fn parse_tail(&mut self) -> Result<Tail> {
        // A block may open on a later line; the newlines skipped here also
        // terminate the directive when no block follows.
        let saw_newline = matches!(self.peek(), Token::Newline);
        while matches!(self.peek(), Token::Newline) {
            self.advance()?;
        }

        if matches!(self.peek(), Token::LeftBrace) {
            let open = self.expect(Token::LeftBrace)?;
            return Ok(Tail::Block(open));
        }

        if saw_newline {
            return Ok(Tail::Leaf);
        }

        match self.peek() {
            Token::Semicolon => {
                self.advance()?;
            }
            Token::RightBrace | Token::Eof => {}
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.display_name(),
                    span: self.peek_span(),
                });
            }
        }

        Ok(Tail::Leaf)
    }

    fn parse_arguments(&mut self) -> Result<Arguments> {
        let mut arguments = SmallVec::new();

        loop {
            match self.peek() {
                Token::LineContinuation => {
                    self.advance()?;
                }
                Token::Argument(_) => {
                    if let Token::Argument(value) = self.advance()?.token {
                        arguments.push(value);
                    }
                }
                _ => break,
            }
        }

        Ok(arguments)
    }
}
