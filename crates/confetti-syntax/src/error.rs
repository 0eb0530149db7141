use std::fmt;

/// Source location of a token or error.
///
/// `line` and `col` are 1-based and count Unicode scalar values; `start` and
/// `end` are byte offsets into the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, start: usize, end: usize) -> Self {
        Self { line, col, start, end }
    }

    pub fn single(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, start: offset, end: offset + 1 }
    }
}

/// Flat classification of every failure the reader can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedEncoding,
    ForbiddenCharacter,
    UnexpectedCharacter,
    UnterminatedString,
    InvalidEscapeSequence,
    IllegalEscape,
    MissingArguments,
    UnmatchedBrace,
    UnexpectedToken,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedEncoding => "malformed encoding",
            ErrorKind::ForbiddenCharacter => "forbidden character",
            ErrorKind::UnexpectedCharacter => "unexpected character",
            ErrorKind::UnterminatedString => "unterminated string",
            ErrorKind::InvalidEscapeSequence => "invalid escape sequence",
            ErrorKind::IllegalEscape => "illegal escape",
            ErrorKind::MissingArguments => "missing arguments",
            ErrorKind::UnmatchedBrace => "unmatched brace",
            ErrorKind::UnexpectedToken => "unexpected token",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// The input buffer is not valid UTF-8. `offset` is the byte index of the
    /// first invalid sequence.
    MalformedEncoding { offset: usize },
    ForbiddenCharacter { ch: char, span: Span },
    UnexpectedCharacter { ch: char, span: Span },
    UnterminatedString { span: Span },
    /// A line terminator inside a single-quoted argument.
    UnexpectedNewline { span: Span },
    /// `ch` is `None` when the backslash is the last character of the input.
    InvalidEscape { ch: Option<char>, span: Span },
    /// A `\` + line terminator after characters of an unquoted argument.
    IllegalEscape { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::MalformedEncoding { offset } => Span::single(1, 1, *offset),
            LexError::ForbiddenCharacter { span, .. } => *span,
            LexError::UnexpectedCharacter { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnexpectedNewline { span } => *span,
            LexError::InvalidEscape { span, .. } => *span,
            LexError::IllegalEscape { span } => *span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LexError::MalformedEncoding { .. } => ErrorKind::MalformedEncoding,
            LexError::ForbiddenCharacter { .. } => ErrorKind::ForbiddenCharacter,
            LexError::UnexpectedCharacter { .. } => ErrorKind::UnexpectedCharacter,
            LexError::UnterminatedString { .. } | LexError::UnexpectedNewline { .. } => {
                ErrorKind::UnterminatedString
            }
            LexError::InvalidEscape { .. } => ErrorKind::InvalidEscapeSequence,
            LexError::IllegalEscape { .. } => ErrorKind::IllegalEscape,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::MalformedEncoding { offset } => {
                write!(f, "malformed UTF-8 at byte offset {}", offset)
            }
            LexError::ForbiddenCharacter { ch, span } => {
                write!(
                    f,
                    "forbidden character U+{:04X} at line {}, column {}",
                    *ch as u32, span.line, span.col
                )
            }
            LexError::UnexpectedCharacter { ch, span } => {
                write!(f, "unexpected character '{}' at line {}, column {}", ch, span.line, span.col)
            }
            LexError::UnterminatedString { span } => {
                write!(f, "unterminated quoted argument starting at line {}, column {}", span.line, span.col)
            }
            LexError::UnexpectedNewline { span } => {
                write!(f, "unexpected newline in quoted argument at line {}, column {}", span.line, span.col)
            }
            LexError::InvalidEscape { ch: Some(ch), span } => {
                write!(
                    f,
                    "invalid escape sequence '\\' followed by U+{:04X} at line {}, column {}",
                    *ch as u32, span.line, span.col
                )
            }
            LexError::InvalidEscape { ch: None, span } => {
                write!(f, "invalid escape sequence at end of input (line {}, column {})", span.line, span.col)
            }
            LexError::IllegalEscape { span } => {
                write!(
                    f,
                    "illegal escape: line continuation inside an argument at line {}, column {}",
                    span.line, span.col
                )
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingArguments { span: Span },
    UnmatchedBrace { span: Span },
    UnexpectedToken { found: String, span: Span },
    LexError(LexError),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::MissingArguments { span } => *span,
            ParseError::UnmatchedBrace { span } => *span,
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::LexError(e) => e.span(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MissingArguments { .. } => ErrorKind::MissingArguments,
            ParseError::UnmatchedBrace { .. } => ErrorKind::UnmatchedBrace,
            ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ParseError::LexError(e) => e.kind(),
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }

    pub fn column(&self) -> usize {
        self.span().col
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingArguments { span } => {
                write!(f, "directive must have at least one argument at line {}", span.line)
            }
            ParseError::UnmatchedBrace { span } => {
                write!(f, "unmatched brace at line {}, column {}", span.line, span.col)
            }
            ParseError::UnexpectedToken { found, span } => {
                write!(
                    f,
                    "expected newline, ';' or block after directive at line {}, found {}",
                    span.line, found
                )
            }
            ParseError::LexError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::LexError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::LexError(err)
    }
}
