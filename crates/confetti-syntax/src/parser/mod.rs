mod directives;

use crate::ast::ConfigurationUnit;
use crate::error::{LexError, ParseError, Span};
use crate::lexer::{Lexer, SpannedToken, Token};
use tracing::{debug, trace};

/// Predictive parser for Confetti documents.
///
/// Drives a [`Lexer`] on demand and keeps exactly one token of lookahead.
/// Comments are dropped as they are fetched, so the grammar never sees them.
/// Use the free function [`parse()`] for a convenient entry point.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: SpannedToken,
}

impl<'a> Parser<'a> {
    /// Creates a parser and fetches the first significant token.
    pub fn new(input: &'a str) -> Result<Self, ParseError> {
        Self::from_lexer(Lexer::new(input))
    }

    /// Like [`Parser::new`], for input whose encoding has not been checked yet.
    pub fn from_bytes(input: &'a [u8]) -> Result<Self, ParseError> {
        Self::from_lexer(Lexer::from_bytes(input))
    }

    fn from_lexer(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let current = Self::fetch(&mut lexer)?;
        Ok(Self { lexer, current })
    }

    fn fetch(lexer: &mut Lexer<'a>) -> Result<SpannedToken, LexError> {
        loop {
            let st = lexer.next_token()?;
            if !matches!(st.token, Token::Comment(_)) {
                trace!(line = st.span.line, col = st.span.col, token = %st.token.display_name());
                return Ok(st);
            }
        }
    }

    #[inline]
    pub(super) fn peek(&self) -> &Token {
        &self.current.token
    }

    #[inline]
    pub(super) fn peek_span(&self) -> Span {
        self.current.span
    }

    /// Returns the current token and moves to the next significant one.
    pub(super) fn advance(&mut self) -> Result<SpannedToken, ParseError> {
        let next = Self::fetch(&mut self.lexer)?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(super) fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if *self.peek() == expected {
            return Ok(self.advance()?.span);
        }

        Err(ParseError::UnexpectedToken {
            found: self.peek().display_name(),
            span: self.peek_span(),
        })
    }

    /// Parses the whole document.
    pub fn parse(mut self) -> Result<ConfigurationUnit, ParseError> {
        let directives = self.parse_directives()?;
        Ok(ConfigurationUnit::new(directives))
    }
}

/// Parses a Confetti document into a [`ConfigurationUnit`].
///
/// This is the main entry point. Either the complete tree or the first error
/// is returned; there is no recovery.
pub fn parse(input: &str) -> Result<ConfigurationUnit, ParseError> {
    debug!(bytes = input.len(), "parsing configuration");
    let unit = Parser::new(input)?.parse()?;
    debug!(directives = unit.len(), "parsed configuration");
    Ok(unit)
}

/// Parses raw bytes, reporting [`LexError::MalformedEncoding`] for invalid UTF-8.
pub fn parse_bytes(input: &[u8]) -> Result<ConfigurationUnit, ParseError> {
    debug!(bytes = input.len(), "parsing configuration");
    let unit = Parser::from_bytes(input)?.parse()?;
    debug!(directives = unit.len(), "parsed configuration");
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Directive;
    use crate::error::ErrorKind;

    fn args(directive: &Directive) -> Vec<&str> {
        directive.arguments.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_semicolon_directive() {
        let unit = parse("listen 80;").unwrap();

        assert_eq!(unit.len(), 1);
        assert_eq!(args(&unit.directives[0]), vec!["listen", "80"]);
    }

    #[test]
    fn test_parse_newline_directive() {
        let unit = parse("root /var/www\n").unwrap();
        assert_eq!(args(&unit.directives[0]), vec!["root", "/var/www"]);
    }

    #[test]
    fn test_parse_eof_terminated() {
        let unit = parse("key value").unwrap();
        assert_eq!(args(&unit.directives[0]), vec!["key", "value"]);
    }

    #[test]
    fn test_parse_block() {
        let unit = parse("server {\n    listen 80;\n    server_name example.com\n}\n").unwrap();

        assert_eq!(unit.len(), 1);
        let server = &unit.directives[0];
        assert_eq!(args(server), vec!["server"]);
        assert_eq!(server.subdirectives.len(), 2);
        assert_eq!(args(&server.subdirectives[1]), vec!["server_name", "example.com"]);
    }

    #[test]
    fn test_parse_multiple_on_one_line() {
        let unit = parse("a 1; b 2; c 3").unwrap();
        assert_eq!(unit.len(), 3);
    }

    #[test]
    fn test_parse_brace_on_next_line() {
        let unit = parse("server\n\n{\n  listen 80\n}").unwrap();

        assert_eq!(unit.len(), 1);
        assert_eq!(unit.directives[0].subdirectives.len(), 1);
    }

    #[test]
    fn test_parse_empty_block() {
        let unit = parse("empty {}").unwrap();

        assert_eq!(unit.len(), 1);
        assert!(unit.directives[0].subdirectives.is_empty());
    }

    #[test]
    fn test_parse_block_followed_by_directive_on_same_line() {
        let unit = parse("a {} b").unwrap();
        assert_eq!(unit.len(), 2);
    }

    #[test]
    fn test_comments_are_skipped() {
        let unit = parse("# header\nkey value # trailing\n# footer").unwrap();

        assert_eq!(unit.len(), 1);
        assert_eq!(args(&unit.directives[0]), vec!["key", "value"]);
    }

    #[test]
    fn test_line_continuation_joins_arguments() {
        let unit = parse("key \\\n  value\nnext").unwrap();

        assert_eq!(unit.len(), 2);
        assert_eq!(args(&unit.directives[0]), vec!["key", "value"]);
    }

    #[test]
    fn test_error_missing_arguments() {
        let err = parse(";").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingArguments);
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 1);
    }

    #[test]
    fn test_error_bare_block() {
        assert_eq!(parse("{ a }").unwrap_err().kind(), ErrorKind::MissingArguments);
    }

    #[test]
    fn test_error_stray_closing_brace() {
        let err = parse("key value }").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnmatchedBrace);
        assert_eq!(err.column(), 11);
    }

    #[test]
    fn test_error_unclosed_block_points_at_opening_brace() {
        let err = parse("server {\n  listen 80").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnmatchedBrace);
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 8);
    }

    #[test]
    fn test_lex_error_on_first_token() {
        let err = Parser::new("\u{0}").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ForbiddenCharacter);
    }

    #[test]
    fn test_parse_bytes_rejects_malformed_utf8() {
        let err = parse_bytes(b"key \xC3\x28").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }

    #[test]
    fn test_expect_reports_unexpected_token() {
        let mut parser = Parser::new("key").unwrap();
        let err = parser.expect(Token::LeftBrace).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
        assert!(err.to_string().contains("argument \"key\""));
    }
}
