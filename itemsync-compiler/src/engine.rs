//! Tera-backed placeholder substitution.
//!
//! Sources use a configurable delimiter pair around a token reference:
//!
//! | Delimiter     | Placeholder        |
//! |---------------|--------------------|
//! | `CurlyBraces` | `{{ .Name }}`      |
//! | `Angles`      | `<< .Name >>`      |
//! | `At`          | `@{ .Name }@`      |
//!
//! The leading dot is optional. The source is split into literal text and
//! placeholders, translated into a Tera template (literals inside raw blocks,
//! placeholders as `tokens["Name"]` lookups) and rendered without escaping.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tera::{Context, Tera};

use itemsync_core::types::TokensDelimiter;

use crate::error::CompileError;

static TOKEN_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+([_]?[A-Za-z0-9]+)*$").expect("token key pattern is valid")
});

/// Whether `key` is an acceptable token name.
pub fn is_valid_token_key(key: &str) -> bool {
    TOKEN_KEY_RE.is_match(key)
}

/// Reject the first token key that is not acceptable.
pub fn validate_token_keys(tokens: &BTreeMap<String, String>) -> Result<(), CompileError> {
    match tokens.keys().find(|k| !is_valid_token_key(k)) {
        Some(key) => Err(CompileError::InvalidTokenKey { key: key.clone() }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Substitutes token placeholders in template sources.
pub struct TemplateEngine {
    delimiter: TokensDelimiter,
}

impl TemplateEngine {
    pub fn new(delimiter: TokensDelimiter) -> Self {
        Self { delimiter }
    }

    /// Render `template` against `tokens`.
    ///
    /// Token keys are validated before anything is parsed; every placeholder
    /// must name a supplied token. `source_path` only feeds error messages.
    pub fn render(
        &self,
        template: &str,
        tokens: &BTreeMap<String, String>,
        source_path: &Path,
    ) -> Result<String, CompileError> {
        validate_token_keys(tokens)?;

        let segments = self.split(template, source_path)?;
        if !segments.iter().any(|s| matches!(s, Segment::Placeholder(_))) {
            return Ok(template.to_string());
        }

        let mut translated = String::with_capacity(template.len() + 32);
        for segment in &segments {
            match segment {
                Segment::Literal(text) => push_raw(&mut translated, text),
                Segment::Placeholder(key) => {
                    if !tokens.contains_key(*key) {
                        return Err(CompileError::UnresolvedPlaceholder {
                            key: (*key).to_string(),
                            source_path: source_path.to_path_buf(),
                        });
                    }
                    translated.push_str("{{ tokens[\"");
                    translated.push_str(key);
                    translated.push_str("\"] }}");
                }
            }
        }

        let mut ctx = Context::new();
        ctx.insert("tokens", tokens);
        Ok(Tera::one_off(&translated, &ctx, false)?)
    }

    fn split<'a>(&self, template: &'a str, source_path: &Path) -> Result<Vec<Segment<'a>>, CompileError> {
        let (open, close) = (self.delimiter.open(), self.delimiter.close());
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find(open) {
            if start > 0 {
                segments.push(Segment::Literal(&rest[..start]));
            }
            let after = &rest[start + open.len()..];
            let Some(end) = after.find(close) else {
                return Err(CompileError::MalformedPlaceholder {
                    placeholder: truncate(&rest[start..]),
                    source_path: source_path.to_path_buf(),
                });
            };
            segments.push(Segment::Placeholder(parse_placeholder(&after[..end], source_path)?));
            rest = &after[end + close.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        Ok(segments)
    }
}

fn parse_placeholder<'a>(inner: &'a str, source_path: &Path) -> Result<&'a str, CompileError> {
    let trimmed = inner.trim();
    let key = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if is_valid_token_key(key) {
        Ok(key)
    } else {
        Err(CompileError::MalformedPlaceholder {
            placeholder: trimmed.to_string(),
            source_path: source_path.to_path_buf(),
        })
    }
}

/// Append `text` so Tera emits it verbatim. A raw block ends at the first
/// `endraw` tag, so that word is split across two blocks.
fn push_raw(out: &mut String, text: &str) {
    out.push_str("{% raw %}");
    out.push_str(&text.replace("endraw", "end{% endraw %}{% raw %}raw"));
    out.push_str("{% endraw %}");
}

fn truncate(s: &str) -> String {
    s.chars().take(40).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
