//! Path template expansion for per-resource endpoints.
//!
//! Templates are literal strings with `{name}` and `{+name}` placeholders, as
//! in `/ocean/aws/k8s/cluster/{clusterId}`. `{name}` percent-encodes every
//! byte outside the RFC 3986 unreserved set; `{+name}` is inserted verbatim for
//! values that are already-encoded sub-paths.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Everything except `A-Z a-z 0-9 - _ . ~`.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated expression starting at byte {position}")]
    Unterminated { position: usize },
    #[error("empty expression at byte {position}")]
    EmptyExpression { position: usize },
    #[error("invalid variable name '{name}' at byte {position}")]
    InvalidName { name: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable { name: String, passthrough: bool },
}

/// A parsed template, reusable across expansions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Names referenced by the template, in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Variable { name, .. } => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Substitute `values` into the template. Names without a value expand to
    /// the empty string.
    pub fn expand(&self, values: &HashMap<String, String>) -> String {
        let mut expanded = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => expanded.push_str(text),
                Part::Variable { name, passthrough } => {
                    let value = values.get(name).map(String::as_str).unwrap_or_default();
                    if *passthrough {
                        expanded.push_str(value);
                    } else {
                        expanded.extend(utf8_percent_encode(value, UNRESERVED));
                    }
                }
            }
        }
        expanded
    }
}

/// Parse a template, rejecting unbalanced braces and malformed names.
pub fn parse(template: &str) -> Result<Template, TemplateError> {
    let mut parts = Vec::new();
    let mut offset = 0;
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            parts.push(Part::Literal(rest[..open].to_string()));
        }
        let position = offset + open;
        let after_open = &rest[open + 1..];
        let close = after_open.find('}').ok_or(TemplateError::Unterminated { position })?;
        parts.push(parse_expression(&after_open[..close], position)?);

        let consumed = open + 1 + close + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        parts.push(Part::Literal(rest.to_string()));
    }

    Ok(Template { parts })
}

/// Parse and expand in one step.
///
/// ```rust
/// use std::collections::HashMap;
/// use spotinst_util::uritemplates::expand;
///
/// let values = HashMap::from([("clusterId".to_string(), "o-1a2b3c".to_string())]);
/// let path = expand("/ocean/aws/k8s/cluster/{clusterId}", &values).unwrap();
/// assert_eq!(path, "/ocean/aws/k8s/cluster/o-1a2b3c");
/// ```
pub fn expand(template: &str, values: &HashMap<String, String>) -> Result<String, TemplateError> {
    parse(template).map(|parsed| parsed.expand(values))
}

fn parse_expression(expression: &str, position: usize) -> Result<Part, TemplateError> {
    let (name, passthrough) = match expression.strip_prefix('+') {
        Some(name) => (name, true),
        None => (expression, false),
    };
    if name.is_empty() {
        return Err(TemplateError::EmptyExpression { position });
    }
    if !name.bytes().all(is_name_byte) {
        return Err(TemplateError::InvalidName {
            name: name.to_string(),
            position,
        });
    }
    Ok(Part::Variable {
        name: name.to_string(),
        passthrough,
    })
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-')
}
