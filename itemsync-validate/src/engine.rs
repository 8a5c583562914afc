//! Runs a set of validators over one configuration tree.

use serde_json::Value;

use itemsync_core::Diagnostics;

use crate::path::{lookup, AttrExpr, AttrPath};
use crate::validators::{ValidationContext, Validator};

struct Rule {
    host: AttrExpr,
    validator: Box<dyn Validator>,
}

/// An ordered list of `(host, validator)` rules.
///
/// Host expressions are root-relative and may use `*` to attach a validator
/// to every entry of a map.
#[derive(Default)]
pub struct ValidatorEngine {
    rules: Vec<Rule>,
}

impl ValidatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add).
    pub fn rule(mut self, host: &str, validator: impl Validator + 'static) -> Self {
        self.add(host, validator);
        self
    }

    pub fn add(&mut self, host: &str, validator: impl Validator + 'static) {
        self.rules.push(Rule {
            host: AttrExpr::root(host),
            validator: Box::new(validator),
        });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against `config` and collect all findings.
    ///
    /// A fatal error from one validator becomes a diagnostic and the
    /// remaining rules still run.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            let hosts = match rule.host.resolve(config, &AttrPath::root()) {
                Ok(hosts) => hosts,
                Err(err) => {
                    diagnostics.push(err.to_diagnostic());
                    continue;
                }
            };
            for host in &hosts {
                let value = match lookup(config, host, host) {
                    Ok(value) => value,
                    Err(err) => {
                        diagnostics.push(err.to_diagnostic());
                        continue;
                    }
                };
                let ctx = ValidationContext { config, host, value };
                match rule.validator.validate(&ctx) {
                    Ok(findings) => diagnostics.extend(findings.iter().map(|f| f.to_diagnostic())),
                    Err(fatal) => diagnostics.push(fatal.to_diagnostic()),
                }
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{LengthAtMost, PatternIfAttributeIsOneOf};
    use serde_json::json;

    #[test]
    fn fatal_error_does_not_stop_other_rules() {
        let engine = ValidatorEngine::new()
            .rule(
                "name",
                PatternIfAttributeIsOneOf::new(AttrExpr::relative("../../../x"), ["a"], ["*"]),
            )
            .rule("name", LengthAtMost(2));
        let diags = engine.validate(&json!({"name": "abcd"}));
        assert_eq!(diags.len(), 2);
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Invalid configuration for attribute name", "Invalid attribute value"]);
    }

    #[test]
    fn wildcard_host_runs_per_entry() {
        let engine = ValidatorEngine::new().rule("parts.*.label", LengthAtMost(3));
        let diags = engine.validate(&json!({"parts": {"a": {"label": "long"}, "b": {"label": "ok"}, "c": {"label": "way too long"}}}));
        assert_eq!(diags.errors().count(), 2);
    }
}
