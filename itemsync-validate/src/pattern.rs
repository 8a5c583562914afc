//! Pattern compilation for conditional validators.
//!
//! Wildcard patterns escape every literal character and turn each `*` into
//! `.+`, so a wildcard stands for one or more characters. Alternatives are
//! OR'd and the whole expression is anchored.

use regex::Regex;

/// How a validator's patterns are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternSyntax {
    /// Literal text with `*` wildcards.
    #[default]
    Wildcard,
    /// Regular expressions, OR'd and anchored as given.
    Regex,
}

/// Compile `patterns` into one anchored matcher.
///
/// An empty pattern list compiles to a matcher that accepts nothing.
pub fn compile(patterns: &[String], syntax: PatternSyntax) -> Result<Regex, (String, regex::Error)> {
    let alternatives: Vec<String> = match syntax {
        PatternSyntax::Wildcard => patterns
            .iter()
            .map(|p| regex::escape(p).replace(r"\*", ".+"))
            .collect(),
        PatternSyntax::Regex => patterns.iter().map(|p| format!("(?:{p})")).collect(),
    };
    let expression = if alternatives.is_empty() {
        r"[^\s\S]".to_string()
    } else {
        format!("^(?:{})$", alternatives.join("|"))
    };
    Regex::new(&expression).map_err(|e| (patterns.join(", "), e))
}

/// Compile a single wildcard pattern.
pub fn wildcard(pattern: &str) -> Result<Regex, (String, regex::Error)> {
    compile(&[pattern.to_string()], PatternSyntax::Wildcard)
}
