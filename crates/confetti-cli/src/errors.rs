use colored::*;
use confetti::{ErrorKind, ParseError, Span, split_lines};
use std::fmt;
use std::fmt::Write as _;

/// Error with file context and a hint on how to fix it
pub struct EnhancedError {
    pub message: String,
    pub span: Option<Span>,
    pub file: Option<String>,
    pub source: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl EnhancedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            file: None,
            source: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Print the error to stderr
    pub fn display(&self) {
        eprint!("{}", self.render());
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{} {}", "error:".red().bold(), self.message.bold());

        if let (Some(file), Some(span)) = (&self.file, &self.span) {
            let _ = writeln!(out, "  {} {}:{}:{}", "-->".blue().bold(), file, span.line, span.col);
        }

        if let (Some(source), Some(span)) = (&self.source, &self.span) {
            out.push('\n');
            self.render_source_with_span(&mut out, source, span);
        }

        if let Some(suggestion) = &self.suggestion {
            out.push('\n');
            let _ = writeln!(out, "{} {}", "suggestion:".green().bold(), suggestion);
        }

        if let Some(help) = &self.help {
            out.push('\n');
            let _ = writeln!(out, "{} {}", "help:".cyan().bold(), help);
        }

        out
    }

    fn render_source_with_span(&self, out: &mut String, source: &str, span: &Span) {
        let lines = split_lines(source);

        let line_idx = span.line.saturating_sub(1);

        if line_idx >= lines.len() {
            return;
        }

        let max_line = (span.line + 2).min(lines.len());
        let line_num_width = max_line.to_string().len();

        // Show context: 2 lines before and after
        let start = line_idx.saturating_sub(2);
        let end = (line_idx + 3).min(lines.len());

        for (i, line) in lines.iter().enumerate().take(end).skip(start) {
            let line_num = i + 1;

            if line_num == span.line {
                let _ = writeln!(
                    out,
                    "{:>width$} {} {}",
                    line_num.to_string().blue().bold(),
                    "|".blue().bold(),
                    line,
                    width = line_num_width
                );

                let spaces = " ".repeat(span.col.saturating_sub(1));
                let caret_len = source
                    .get(span.start..span.end)
                    .map(|text| text.chars().count())
                    .unwrap_or(1)
                    .max(1);
                let carets = "^".repeat(caret_len);
                let _ = writeln!(
                    out,
                    "{:>width$} {} {}{}",
                    "",
                    "|".blue().bold(),
                    spaces,
                    carets.red().bold(),
                    width = line_num_width
                );
            } else {
                let _ = writeln!(
                    out,
                    "{:>width$} {} {}",
                    line_num.to_string().dimmed(),
                    "|".blue().bold(),
                    line,
                    width = line_num_width
                );
            }
        }
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnhancedError: {}", self.message)
    }
}

impl std::error::Error for EnhancedError {}

/// Convert a parse failure into an [`EnhancedError`] with a hint for its kind
pub fn enhance_error(err: &ParseError, file: Option<String>, source: Option<String>) -> EnhancedError {
    let label = match err {
        ParseError::LexError(_) => "Syntax error",
        _ => "Parse error",
    };

    let mut enhanced = EnhancedError::new(format!("{}: {}", label, err));

    if err.kind() != ErrorKind::MalformedEncoding {
        enhanced = enhanced.with_span(err.span());
    }

    if let Some(file) = file {
        enhanced = enhanced.with_file(file);
    }

    if let Some(source) = source {
        enhanced = enhanced.with_source(source);
    }

    match err.kind() {
        ErrorKind::MalformedEncoding => enhanced
            .with_suggestion("Re-save the file as UTF-8")
            .with_help("Configuration files must be valid UTF-8 text"),
        ErrorKind::ForbiddenCharacter => enhanced
            .with_suggestion("Remove the control or unassigned character")
            .with_help("Control characters, noncharacters and unassigned code points are not allowed anywhere, including comments"),
        ErrorKind::UnexpectedCharacter => {
            enhanced.with_suggestion("Quote the argument or escape the character with '\\'")
        }
        ErrorKind::UnterminatedString => enhanced
            .with_suggestion("Close the quoted argument with '\"' (or '\"\"\"' for multi-line text)")
            .with_help("Single-quoted arguments cannot span lines; use \"\"\"...\"\"\" or end the line with '\\'"),
        ErrorKind::InvalidEscapeSequence => enhanced
            .with_suggestion("A '\\' must be followed by a visible character")
            .with_help("To put whitespace inside an argument, quote it: \"a b\""),
        ErrorKind::IllegalEscape => enhanced
            .with_suggestion("Put a space before the '\\' to continue the directive on the next line")
            .with_help("An argument itself cannot be split with '\\'; only the directive can"),
        ErrorKind::MissingArguments => enhanced
            .with_suggestion("Remove the stray ';' or '{', or give the directive a name")
            .with_help("Every directive needs at least one argument"),
        ErrorKind::UnmatchedBrace => enhanced
            .with_suggestion("Check that every '{' has a matching '}'"),
        ErrorKind::UnexpectedToken => enhanced
            .with_suggestion("End the directive with a newline or ';'"),
    }
}
