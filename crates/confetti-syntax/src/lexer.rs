use crate::error::{LexError, Span};
use crate::unicode::{
    BYTE_ORDER_MARK, SUBSTITUTE, is_argument_char, is_escapable, is_forbidden, is_line_terminator,
    is_whitespace,
};
use std::fmt;
use std::iter::FusedIterator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Eof,
    Newline,
    Semicolon,
    LeftBrace,
    RightBrace,
    /// Already unescaped argument text, quoted or not.
    Argument(String),
    /// Comment text including the leading `#`.
    Comment(String),
    /// A standalone `\` + line terminator: the directive continues on the next line.
    LineContinuation,
}

impl Token {
    pub fn display_name(&self) -> String {
        match self {
            Token::Eof => "end of file".to_string(),
            Token::Newline => "newline".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::LeftBrace => "'{'".to_string(),
            Token::RightBrace => "'}'".to_string(),
            Token::Argument(s) => format!("argument \"{}\"", s),
            Token::Comment(_) => "comment".to_string(),
            Token::LineContinuation => "line continuation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Pull-based tokenizer over an in-memory buffer.
///
/// The buffer is checked for valid UTF-8 on the first call to
/// [`Lexer::next_token`], so a [`LexError::MalformedEncoding`] is reported
/// before any token is produced. A leading byte-order mark is skipped.
pub struct Lexer<'a> {
    raw: &'a [u8],
    input: &'a str,
    started: bool,
    finished: bool,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    pub fn from_bytes(raw: &'a [u8]) -> Self {
        Self {
            raw,
            input: "",
            started: false,
            finished: false,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn begin(&mut self) -> Result<(), LexError> {
        let input = std::str::from_utf8(self.raw)
            .map_err(|e| LexError::MalformedEncoding { offset: e.valid_up_to() })?;

        self.input = input;
        if input.starts_with(BYTE_ORDER_MARK) {
            self.pos = BYTE_ORDER_MARK.len_utf8();
        }
        self.started = true;
        Ok(())
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    /// A Control-Z that is the last character of the buffer ends the input.
    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
            || (self.pos + SUBSTITUTE.len_utf8() == self.input.len()
                && self.peek_nth(0) == Some(SUBSTITUTE))
    }

    #[inline]
    fn current(&self) -> Option<char> {
        if self.at_end() { None } else { self.peek_nth(0) }
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_nth(0)?;
        self.pos += ch.len_utf8();
        self.col += 1;
        Some(ch)
    }

    /// Call after bumping a line terminator; folds CRLF into one line break.
    fn finish_line(&mut self, terminator: char) {
        if terminator == '\r' && self.current() == Some('\n') {
            self.bump();
        }
        self.line += 1;
        self.col = 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if !is_whitespace(ch) {
                break;
            }
            self.bump();
        }
    }

    fn here(&self) -> Span {
        let len = self.peek_nth(0).map(char::len_utf8).unwrap_or(0);
        Span::new(self.line, self.col, self.pos, self.pos + len)
    }

    fn forbidden(&self, ch: char) -> LexError {
        LexError::ForbiddenCharacter { ch, span: self.here() }
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        if !self.started {
            self.begin()?;
        }

        self.skip_whitespace();

        let start_line = self.line;
        let start_col = self.col;
        let start_offset = self.pos;
        let spanned = |token: Token, end: usize| SpannedToken {
            token,
            span: Span::new(start_line, start_col, start_offset, end),
        };

        let Some(ch) = self.current() else {
            return Ok(spanned(Token::Eof, self.pos));
        };

        if is_forbidden(ch) {
            return Err(self.forbidden(ch));
        }

        if is_line_terminator(ch) {
            self.bump();
            self.finish_line(ch);
            return Ok(spanned(Token::Newline, self.pos));
        }

        match ch {
            '#' => {
                let comment = self.scan_comment()?;
                Ok(spanned(Token::Comment(comment), self.pos))
            }
            ';' => {
                self.bump();
                Ok(spanned(Token::Semicolon, self.pos))
            }
            '{' => {
                self.bump();
                Ok(spanned(Token::LeftBrace, self.pos))
            }
            '}' => {
                self.bump();
                Ok(spanned(Token::RightBrace, self.pos))
            }
            '"' => {
                let value = self.scan_quoted()?;
                Ok(spanned(Token::Argument(value), self.pos))
            }
            _ if is_argument_char(ch) => {
                let token = self.scan_unquoted()?;
                Ok(spanned(token, self.pos))
            }
            _ => Err(LexError::UnexpectedCharacter { ch, span: self.here() }),
        }
    }

    fn scan_comment(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.bump();

        while let Some(ch) = self.current() {
            if is_line_terminator(ch) {
                break;
            }
            if is_forbidden(ch) {
                return Err(self.forbidden(ch));
            }
            self.bump();
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn scan_unquoted(&mut self) -> Result<Token, LexError> {
        let mut buf = String::new();

        while let Some(ch) = self.current() {
            if ch == '\\' {
                let escape_span = self.here();
                self.bump();

                match self.current() {
                    Some(next) if is_line_terminator(next) => {
                        if !buf.is_empty() {
                            return Err(LexError::IllegalEscape { span: escape_span });
                        }
                        self.bump();
                        self.finish_line(next);
                        self.skip_whitespace();
                        return Ok(Token::LineContinuation);
                    }
                    Some(next) if is_escapable(next) => {
                        buf.push(next);
                        self.bump();
                        continue;
                    }
                    next => {
                        return Err(LexError::InvalidEscape { ch: next, span: escape_span });
                    }
                }
            }

            if !is_argument_char(ch) {
                break;
            }

            buf.push(ch);
            self.bump();
        }

        Ok(Token::Argument(buf))
    }

    fn scan_quoted(&mut self) -> Result<String, LexError> {
        let opening = self.here();
        self.bump();

        if self.current() == Some('"') {
            self.bump();
            if self.current() == Some('"') {
                self.bump();
                return self.scan_triple_quoted(opening);
            }
            return Ok(String::new());
        }

        self.scan_single_quoted(opening)
    }

    /// Handles `\` inside a quoted argument. A backslash before a line
    /// terminator splices the two physical lines without adding content.
    fn scan_quoted_escape(&mut self, buf: &mut String) -> Result<(), LexError> {
        let escape_span = self.here();
        self.bump();

        match self.current() {
            Some(next) if is_line_terminator(next) => {
                self.bump();
                self.finish_line(next);
                Ok(())
            }
            Some(next) if is_escapable(next) => {
                buf.push(next);
                self.bump();
                Ok(())
            }
            next => Err(LexError::InvalidEscape { ch: next, span: escape_span }),
        }
    }

    fn scan_single_quoted(&mut self, opening: Span) -> Result<String, LexError> {
        let mut buf = String::new();

        loop {
            let Some(ch) = self.current() else {
                return Err(LexError::UnterminatedString { span: opening });
            };

            match ch {
                '"' => {
                    self.bump();
                    return Ok(buf);
                }
                '\\' => self.scan_quoted_escape(&mut buf)?,
                _ if is_line_terminator(ch) => {
                    return Err(LexError::UnexpectedNewline { span: self.here() });
                }
                _ if is_forbidden(ch) => return Err(self.forbidden(ch)),
                _ => {
                    buf.push(ch);
                    self.bump();
                }
            }
        }
    }

    fn scan_triple_quoted(&mut self, opening: Span) -> Result<String, LexError> {
        let mut buf = String::new();

        loop {
            let Some(ch) = self.current() else {
                return Err(LexError::UnterminatedString { span: opening });
            };

            match ch {
                '"' if self.peek_nth(1) == Some('"') && self.peek_nth(2) == Some('"') => {
                    self.bump();
                    self.bump();
                    self.bump();
                    return Ok(buf);
                }
                '\\' => self.scan_quoted_escape(&mut buf)?,
                _ if is_line_terminator(ch) => {
                    buf.push(ch);
                    self.bump();
                    if ch == '\r' && self.current() == Some('\n') {
                        buf.push('\n');
                    }
                    self.finish_line(ch);
                }
                _ if is_forbidden(ch) => return Err(self.forbidden(ch)),
                _ => {
                    buf.push(ch);
                    self.bump();
                }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        if matches!(result, Err(_) | Ok(SpannedToken { token: Token::Eof, .. })) {
            self.finished = true;
        }
        Some(result)
    }
}

impl FusedIterator for Lexer<'_> {}

/// Tokenizes the whole input. The returned vector always ends with [`Token::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(input).collect()
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "<eof>"),
            Token::Newline => write!(f, "newline"),
            Token::Semicolon => write!(f, ";"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Argument(s) => write!(f, "<{}>", s),
            Token::Comment(s) => write!(f, "{}", s),
            Token::LineContinuation => write!(f, "\\"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    fn arg(s: &str) -> Token {
        Token::Argument(s.to_string())
    }

    #[test]
    fn test_tokenize_structural() {
        assert_eq!(
            kinds("a;{}\n"),
            vec![
                arg("a"),
                Token::Semicolon,
                Token::LeftBrace,
                Token::RightBrace,
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_comment() {
        let input = "# this is a comment\nkey value";
        let tokens = kinds(input);

        assert_eq!(tokens[0], Token::Comment("# this is a comment".to_string()));
        assert_eq!(tokens[1], Token::Newline);
        assert_eq!(tokens[2], arg("key"));
    }

    #[test]
    fn test_comment_at_eof() {
        assert_eq!(kinds("# end"), vec![Token::Comment("# end".to_string()), Token::Eof]);
    }

    #[test]
    fn test_empty_quoted_string() {
        assert_eq!(kinds(r#""" x"#), vec![arg(""), arg("x"), Token::Eof]);
    }

    #[test]
    fn test_quoted_argument_keeps_reserved_chars() {
        assert_eq!(kinds(r#""a # b; {c}""#), vec![arg("a # b; {c}"), Token::Eof]);
    }

    #[test]
    fn test_escapes_in_quoted() {
        assert_eq!(kinds(r#""say \"hi\" \\ \n""#), vec![arg(r#"say "hi" \ n"#), Token::Eof]);
    }

    #[test]
    fn test_triple_quoted_preserves_newlines() {
        assert_eq!(kinds("\"\"\"one\r\ntwo\nthree\"\"\""), vec![arg("one\r\ntwo\nthree"), Token::Eof]);
    }

    #[test]
    fn test_triple_quoted_advances_line() {
        let tokens = tokenize("\"\"\"a\nb\"\"\" c").unwrap();
        assert_eq!(tokens[1].token, arg("c"));
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.col, 6);
    }

    #[test]
    fn test_unquoted_escape() {
        assert_eq!(kinds(r"a\;b \{ \#x"), vec![arg("a;b"), arg("{"), arg("#x"), Token::Eof]);
    }

    #[test]
    fn test_standalone_line_continuation() {
        assert_eq!(
            kinds("key \\\n    value"),
            vec![arg("key"), Token::LineContinuation, arg("value"), Token::Eof]
        );
    }

    #[test]
    fn test_trailing_line_continuation_is_illegal() {
        let err = tokenize("key value\\\nmore").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalEscape);
    }

    #[test]
    fn test_escape_of_whitespace_is_invalid() {
        let err = tokenize("a\\ b").unwrap_err();
        assert_eq!(err, LexError::InvalidEscape { ch: Some(' '), span: Span::new(1, 2, 1, 2) });
    }

    #[test]
    fn test_escape_at_end_of_input() {
        let err = tokenize("abc\\").unwrap_err();
        assert!(matches!(err, LexError::InvalidEscape { ch: None, .. }));
    }

    #[test]
    fn test_crlf_is_one_newline() {
        let tokens = tokenize("a\r\nb").unwrap();
        assert_eq!(tokens[1].token, Token::Newline);
        assert_eq!(tokens[2].token, arg("b"));
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.col, 1);
    }

    #[test]
    fn test_lone_cr_is_newline() {
        assert_eq!(kinds("a\rb"), vec![arg("a"), Token::Newline, arg("b"), Token::Eof]);
    }

    #[test]
    fn test_bom_is_skipped() {
        assert_eq!(kinds("\u{FEFF}key"), vec![arg("key"), Token::Eof]);
    }

    #[test]
    fn test_control_z_at_end() {
        assert_eq!(kinds("key\u{1A}"), vec![arg("key"), Token::Eof]);
        assert_eq!(kinds("# c\u{1A}"), vec![Token::Comment("# c".to_string()), Token::Eof]);
    }

    #[test]
    fn test_control_z_in_middle_is_forbidden() {
        let err = tokenize("a \u{1A} b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForbiddenCharacter);
        assert_eq!(err.span().col, 3);
    }

    #[test]
    fn test_malformed_utf8() {
        let mut lexer = Lexer::from_bytes(b"key \xFF value");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err, LexError::MalformedEncoding { offset: 4 });
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { span: Span::new(1, 1, 0, 1) });
    }

    #[test]
    fn test_newline_in_single_quoted() {
        let err = tokenize("\"abc\ndef\"").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedNewline { .. }));
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("key \"value\"").unwrap();

        assert_eq!(tokens[0].span, Span::new(1, 1, 0, 3));
        assert_eq!(tokens[1].span, Span::new(1, 5, 4, 11));
    }

    #[test]
    fn test_iterator_fuses_after_eof() {
        let mut lexer = Lexer::new("a");
        assert!(matches!(lexer.next(), Some(Ok(SpannedToken { token: Token::Argument(_), .. }))));
        assert!(matches!(lexer.next(), Some(Ok(SpannedToken { token: Token::Eof, .. }))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut lexer = Lexer::new("\u{0}");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }
}
