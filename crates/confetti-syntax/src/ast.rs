use smallvec::SmallVec;
use std::fmt;

const INDENT: &str = "    ";

/// A node of the configuration tree.
///
/// A directive always carries at least one argument. The first argument
/// conventionally names the directive, but the reader attaches no meaning to
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub arguments: SmallVec<[String; 4]>,
    pub subdirectives: Vec<Directive>,
}

impl Directive {
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments: SmallVec<[String; 4]> = arguments.into_iter().map(Into::into).collect();
        debug_assert!(!arguments.is_empty(), "a directive needs at least one argument");

        Self { arguments, subdirectives: Vec::new() }
    }

    pub fn with_subdirectives(mut self, subdirectives: Vec<Directive>) -> Self {
        self.subdirectives = subdirectives;
        self
    }

    pub fn name(&self) -> &str {
        self.arguments.first().map(String::as_str).unwrap_or_default()
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn subdirectives(&self) -> &[Directive] {
        &self.subdirectives
    }

    /// False for `name {}`: an empty block leaves nothing in the tree.
    pub fn has_subdirectives(&self) -> bool {
        !self.subdirectives.is_empty()
    }
}

// Deep trees would otherwise be torn down through one stack frame per level.
impl Drop for Directive {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.subdirectives);
        while let Some(mut directive) = pending.pop() {
            pending.append(&mut directive.subdirectives);
        }
    }
}

/// The root of a successfully parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationUnit {
    pub directives: Vec<Directive>,
}

impl ConfigurationUnit {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.directives.iter()
    }

    /// Canonical text form: one `<arg> <arg>` line per directive, children
    /// wrapped in `[` `]` and indented four spaces per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_directives(&mut out, &self.directives);
        out
    }
}

fn render_directives(out: &mut String, directives: &[Directive]) {
    let mut levels = vec![directives.iter()];

    while !levels.is_empty() {
        let depth = levels.len() - 1;

        let Some(directive) = levels[depth].next() else {
            levels.pop();
            if !levels.is_empty() {
                push_indent(out, depth - 1);
                out.push_str("]\n");
            }
            continue;
        };

        push_indent(out, depth);
        for (i, arg) in directive.arguments.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push('<');
            out.push_str(arg);
            out.push('>');
        }

        if directive.subdirectives.is_empty() {
            out.push('\n');
        } else {
            out.push_str(" [\n");
            levels.push(directive.subdirectives.iter());
        }
    }
}

#[inline]
fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl fmt::Display for ConfigurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<'a> IntoIterator for &'a ConfigurationUnit {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}
