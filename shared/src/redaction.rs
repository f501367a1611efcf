//! Obfuscation of sensitive fields in log messages
//!
//! Log lines carry personal data as `field=value` pairs (text format) or
//! `"field":"value"` pairs (JSON format). The [`Redactor`] rewrites the
//! value of every configured field to a fixed replacement string.

use regex_lite::{Captures, Regex};
use std::borrow::Cow;

/// Error raised when redaction patterns fail to compile
pub use regex_lite::Error as PatternError;

/// Replace the value of every `field=value` occurrence in `message`.
///
/// A value runs until the next character contained in `separator`. Fields
/// also match as the tail of a longer name, and empty values are kept.
///
/// ```
/// use session_auth_shared::redaction::filter_datum;
///
/// let out = filter_datum(&["password"], "xxx", "name=bob;password=hunter2;", ";").unwrap();
/// assert_eq!(out, "name=bob;password=xxx;");
/// ```
pub fn filter_datum<S: AsRef<str>>(
    fields: &[S],
    redaction: &str,
    message: &str,
    separator: &str,
) -> Result<String, PatternError> {
    let redactor = Redactor::new(fields, redaction, separator)?;
    Ok(redactor.redact(message).into_owned())
}

/// Pre-compiled redaction rules, built once and shared by log writers
#[derive(Debug, Clone)]
pub struct Redactor {
    redaction: String,
    patterns: Option<Patterns>,
}

#[derive(Debug, Clone)]
struct Patterns {
    key_value: Regex,
    json: Regex,
}

impl Redactor {
    /// Build a redactor for `fields`
    ///
    /// `separators` lists every character that terminates a plain-text
    /// value. An empty field list yields a redactor that changes nothing.
    pub fn new<S: AsRef<str>>(
        fields: &[S],
        redaction: &str,
        separators: &str,
    ) -> Result<Self, PatternError> {
        let names: Vec<String> = fields
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !f.is_empty())
            .map(regex_lite::escape)
            .collect();

        if names.is_empty() {
            return Ok(Self {
                redaction: redaction.to_string(),
                patterns: None,
            });
        }

        let alternation = names.join("|");
        let excluded: String = separators
            .chars()
            .map(|c| regex_lite::escape(&c.to_string()))
            .collect();
        let value_class = if excluded.is_empty() {
            ".".to_string()
        } else {
            format!("[^{}]", excluded)
        };

        let key_value = Regex::new(&format!(r"({})=({}+)", alternation, value_class))?;
        let json = Regex::new(&format!(r#""({})":"((?:[^"\\]|\\.)*)""#, alternation))?;

        Ok(Self {
            redaction: redaction.to_string(),
            patterns: Some(Patterns { key_value, json }),
        })
    }

    /// Whether any field is configured
    pub fn is_active(&self) -> bool {
        self.patterns.is_some()
    }

    /// Redact `message`, borrowing it unchanged when nothing matches
    pub fn redact<'a>(&self, message: &'a str) -> Cow<'a, str> {
        let Some(patterns) = &self.patterns else {
            return Cow::Borrowed(message);
        };

        let text = patterns.key_value.replace_all(message, |caps: &Captures<'_>| {
            format!("{}={}", &caps[1], self.redaction)
        });

        if !patterns.json.is_match(&text) {
            return text;
        }

        let json = patterns
            .json
            .replace_all(&text, |caps: &Captures<'_>| {
                format!("\"{}\":\"{}\"", &caps[1], self.redaction)
            })
            .into_owned();
        Cow::Owned(json)
    }
}
