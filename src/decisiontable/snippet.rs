use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const PARAM_PLACEHOLDER: &str = "$param";

static INDEXED_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").expect("Hardcode regex pattern"));

static FORALL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"forall\(([^()]*)\)\{([^{}]*)\}").expect("Hardcode regex pattern"));

/// Any placeholder a code template may contain.
pub(crate) static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(param|\d+)|forall\(").expect("Hardcode regex pattern"));

/// Placeholder style of a code template.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnippetKind {
    /// No placeholder, the template is used as is
    Literal,
    /// `$param` takes the whole cell value
    Single,
    /// `$1`, `$2`, ... take the comma separated parts of the value
    Indexed,
    /// `forall(<delimiter>){<body>}` repeats the body per comma separated part
    ForAll,
}

/// A code template of one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snippet {
    template: String,
    kind: SnippetKind,
}

impl Snippet {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let kind = if FORALL_PATTERN.is_match(&template) {
            SnippetKind::ForAll
        } else if template.contains(PARAM_PLACEHOLDER) {
            SnippetKind::Single
        } else if INDEXED_PATTERN.is_match(&template) {
            SnippetKind::Indexed
        } else {
            SnippetKind::Literal
        };
        Self { template, kind }
    }

    pub fn kind(&self) -> SnippetKind {
        self.kind
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn has_placeholder(&self) -> bool {
        self.kind != SnippetKind::Literal
    }

    /// Fills the template with a cell value.
    pub fn render(&self, value: &str, trim: bool) -> String {
        match self.kind {
            SnippetKind::Literal => self.template.to_owned(),
            SnippetKind::Single => self.template.replace(PARAM_PLACEHOLDER, value),
            SnippetKind::Indexed => {
                let params = split_params(value, trim);
                INDEXED_PATTERN
                    .replace_all(&self.template, |caps: &Captures| {
                        caps[1]
                            .parse::<usize>()
                            .ok()
                            .and_then(|index| index.checked_sub(1))
                            .and_then(|index| params.get(index))
                            .map_or_else(|| caps[0].to_owned(), String::to_owned)
                    })
                    .into_owned()
            }
            SnippetKind::ForAll => {
                let params = split_params(value, trim);
                FORALL_PATTERN
                    .replace_all(&self.template, |caps: &Captures| {
                        let delimiter = match caps[1].trim() {
                            "" => " ".to_owned(),
                            "," => ", ".to_owned(),
                            other => format!(" {} ", other),
                        };
                        params
                            .iter()
                            .map(|param| caps[2].replace('$', param))
                            .collect::<Vec<_>>()
                            .join(&delimiter)
                    })
                    .into_owned()
            }
        }
    }
}

/// Splits a cell value on commas outside double quotes.
///
/// A comma escaped as `\,` stays in its part.
pub fn split_params(value: &str, trim: bool) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => params.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    params.push(current);

    if trim {
        params.iter_mut().for_each(|param| *param = param.trim().to_owned());
    }
    params
}

/// Replaces `from` with `to` wherever it occurs outside double quotes.
pub(crate) fn replace_out_of_quotes(text: &str, from: &str, to: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if !in_quotes && rest.starts_with(from) {
            result.push_str(to);
            rest = &rest[from.len()..];
            continue;
        }
        if c == '\\' && in_quotes {
            // keep escaped characters inside a string literal
            let mut escaped = rest.chars();
            escaped.next();
            result.push(c);
            if let Some(next) = escaped.next() {
                result.push(next);
            }
            rest = escaped.as_str();
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
        }
        result.push(c);
        rest = &rest[c.len_utf8()..];
    }
    result
}
