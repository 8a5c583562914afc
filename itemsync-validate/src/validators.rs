//! Validator species.
//!
//! Each validator is attached to a host attribute by the
//! [`ValidatorEngine`](crate::engine::ValidatorEngine) and sees the host's
//! current value plus the whole configuration tree.

use serde_json::Value;

use itemsync_core::{ParameterKind, ProcessingMode, TokensDelimiter};

use crate::error::ValidationError;
use crate::path::{lookup, AttrExpr, AttrPath, Lookup};
use crate::pattern::{self, PatternSyntax};

/// What a validator sees for one host location.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub config: &'a Value,
    pub host: &'a AttrPath,
    pub value: Lookup<'a>,
}

/// `Ok` carries findings; `Err` aborts this validator only.
pub type Outcome = Result<Vec<ValidationError>, ValidationError>;

pub trait Validator: Send + Sync {
    fn description(&self) -> String;
    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome;
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equal as JSON, or equal in their displayed form (`1` and `"1"`).
fn values_match(a: &Value, b: &Value) -> bool {
    a == b || display_value(a) == display_value(b)
}

fn failed(attribute: &AttrPath, message: impl Into<String>, value: impl Into<String>) -> ValidationError {
    ValidationError::ValidationFailed {
        attribute: attribute.to_string(),
        message: message.into(),
        value: value.into(),
    }
}

// ---------------------------------------------------------------------------
// PatternIfAttributeIsOneOf
// ---------------------------------------------------------------------------

/// When the trigger attribute equals one of `trigger_values`, the host must
/// match one of `patterns`.
///
/// In map-keys mode every key of a map host is checked independently and a
/// null map has nothing to check.
#[derive(Debug, Clone)]
pub struct PatternIfAttributeIsOneOf {
    trigger: AttrExpr,
    trigger_values: Vec<Value>,
    patterns: Vec<String>,
    syntax: PatternSyntax,
    message: Option<String>,
    map_keys: bool,
}

impl PatternIfAttributeIsOneOf {
    pub fn new<V, P>(trigger: AttrExpr, trigger_values: V, patterns: P) -> Self
    where
        V: IntoIterator,
        V::Item: Into<Value>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            trigger,
            trigger_values: trigger_values.into_iter().map(Into::into).collect(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            syntax: PatternSyntax::Wildcard,
            message: None,
            map_keys: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_syntax(mut self, syntax: PatternSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Check the keys of a map host instead of the host value itself.
    pub fn on_map_keys(mut self) -> Self {
        self.map_keys = true;
        self
    }

    fn check_host(&self, ctx: &ValidationContext<'_>) -> Outcome {
        let matcher = || {
            pattern::compile(&self.patterns, self.syntax).map_err(|(pattern, source)| {
                ValidationError::PatternCompileFailure {
                    attribute: ctx.host.to_string(),
                    pattern,
                    source,
                }
            })
        };

        let value = match ctx.value {
            Lookup::Unknown => return Ok(Vec::new()),
            Lookup::Null if self.map_keys => return Ok(Vec::new()),
            Lookup::Null => {
                return Ok(vec![failed(
                    ctx.host,
                    format!("is empty, {}", self.description()),
                    "<null>",
                )])
            }
            Lookup::Value(v) => v,
        };

        let re = matcher()?;
        let findings = match (self.map_keys, value) {
            (true, Value::Object(map)) => map
                .keys()
                .filter(|key| !re.is_match(key))
                .map(|key| failed(&ctx.host.child(key.clone()), self.description(), key.clone()))
                .collect(),
            (false, Value::String(s)) if re.is_match(s) => Vec::new(),
            (_, other) => vec![failed(ctx.host, self.description(), display_value(other))],
        };
        Ok(findings)
    }
}

impl Validator for PatternIfAttributeIsOneOf {
    fn description(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("value must match expression patterns '{}'", self.patterns.join(", ")),
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        if ctx.value == Lookup::Unknown {
            return Ok(Vec::new());
        }

        let locations = self.trigger.resolve(ctx.config, ctx.host)?;
        if locations.is_empty() {
            return Err(ValidationError::MissingTrigger {
                attribute: ctx.host.to_string(),
                trigger: self.trigger.to_string(),
            });
        }

        let mut triggered = false;
        for location in &locations {
            match lookup(ctx.config, location, ctx.host)? {
                Lookup::Null | Lookup::Unknown => return Ok(Vec::new()),
                Lookup::Value(v) => {
                    triggered |= self.trigger_values.iter().any(|expected| values_match(v, expected));
                }
            }
        }

        if triggered {
            self.check_host(ctx)
        } else {
            Ok(Vec::new())
        }
    }
}

// ---------------------------------------------------------------------------
// StructuralPresenceIfMarker
// ---------------------------------------------------------------------------

/// When the marker attribute equals `marker_value`, the host map must contain
/// at least one key matching the wildcard `pattern`.
#[derive(Debug, Clone)]
pub struct StructuralPresenceIfMarker {
    marker: AttrExpr,
    marker_value: Value,
    pattern: String,
    message: Option<String>,
}

impl StructuralPresenceIfMarker {
    pub fn new(marker: AttrExpr, marker_value: impl Into<Value>, pattern: impl Into<String>) -> Self {
        Self {
            marker,
            marker_value: marker_value.into(),
            pattern: pattern.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Validator for StructuralPresenceIfMarker {
    fn description(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "must contain at least one entry matching '{}' when {} is '{}'",
                self.pattern,
                self.marker,
                display_value(&self.marker_value)
            ),
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        if ctx.value == Lookup::Unknown {
            return Ok(Vec::new());
        }

        let mut active = false;
        // An unset marker has nothing to enforce.
        for location in self.marker.resolve(ctx.config, ctx.host)? {
            match lookup(ctx.config, &location, ctx.host)? {
                Lookup::Null | Lookup::Unknown => return Ok(Vec::new()),
                Lookup::Value(v) => active |= values_match(v, &self.marker_value),
            }
        }
        if !active {
            return Ok(Vec::new());
        }

        let map = match ctx.value {
            Lookup::Value(Value::Object(map)) => map,
            Lookup::Value(other) => return Ok(vec![failed(ctx.host, self.description(), display_value(other))]),
            _ => return Ok(vec![failed(ctx.host, self.description(), "<null>")]),
        };

        let re = pattern::wildcard(&self.pattern).map_err(|(pattern, source)| {
            ValidationError::PatternCompileFailure {
                attribute: ctx.host.to_string(),
                pattern,
                source,
            }
        })?;
        if map.keys().any(|key| re.is_match(key)) {
            Ok(Vec::new())
        } else {
            Ok(vec![failed(ctx.host, self.description(), "no matching entries found")])
        }
    }
}

// ---------------------------------------------------------------------------
// Presence combinators
// ---------------------------------------------------------------------------

/// The host may not be set together with any of `others`.
#[derive(Debug, Clone)]
pub struct ConflictsWith {
    others: Vec<AttrExpr>,
}

impl ConflictsWith {
    pub fn new(others: impl IntoIterator<Item = AttrExpr>) -> Self {
        Self {
            others: others.into_iter().collect(),
        }
    }
}

impl Validator for ConflictsWith {
    fn description(&self) -> String {
        let names: Vec<_> = self.others.iter().map(ToString::to_string).collect();
        format!("cannot be set together with [{}]", names.join(", "))
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        if !ctx.value.is_set() {
            return Ok(Vec::new());
        }
        let mut findings = Vec::new();
        for other in &self.others {
            for location in other.resolve(ctx.config, ctx.host)? {
                if lookup(ctx.config, &location, ctx.host)?.is_set() {
                    findings.push(failed(
                        ctx.host,
                        format!("attribute {location} cannot be specified when {} is specified", ctx.host),
                        location.to_string(),
                    ));
                }
            }
        }
        Ok(findings)
    }
}

/// The host must be set whenever any of `triggers` is set.
#[derive(Debug, Clone)]
pub struct RequiredIfAttributeIsSet {
    triggers: Vec<AttrExpr>,
}

impl RequiredIfAttributeIsSet {
    pub fn new(triggers: impl IntoIterator<Item = AttrExpr>) -> Self {
        Self {
            triggers: triggers.into_iter().collect(),
        }
    }
}

impl Validator for RequiredIfAttributeIsSet {
    fn description(&self) -> String {
        let names: Vec<_> = self.triggers.iter().map(ToString::to_string).collect();
        format!("must be set when [{}] is set", names.join(", "))
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        if ctx.value.is_set() {
            return Ok(Vec::new());
        }
        for trigger in &self.triggers {
            for location in trigger.resolve(ctx.config, ctx.host)? {
                match lookup(ctx.config, &location, ctx.host)? {
                    Lookup::Unknown => return Ok(Vec::new()),
                    Lookup::Value(_) => {
                        return Ok(vec![failed(
                            ctx.host,
                            format!("attribute {} must be specified when {location} is specified", ctx.host),
                            "<null>",
                        )])
                    }
                    Lookup::Null => {}
                }
            }
        }
        Ok(Vec::new())
    }
}

/// Exactly one of the host and `others` must be set. With no `others` this
/// makes the host required.
#[derive(Debug, Clone)]
pub struct ExactlyOneOf {
    others: Vec<AttrExpr>,
}

impl ExactlyOneOf {
    pub fn new(others: impl IntoIterator<Item = AttrExpr>) -> Self {
        Self {
            others: others.into_iter().collect(),
        }
    }

    /// The host alone must be set.
    pub fn required() -> Self {
        Self { others: Vec::new() }
    }
}

impl Validator for ExactlyOneOf {
    fn description(&self) -> String {
        let names: Vec<_> = self.others.iter().map(ToString::to_string).collect();
        format!("exactly one of this attribute and [{}] must be set", names.join(", "))
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        let mut lookups = vec![ctx.value];
        for other in &self.others {
            for location in other.resolve(ctx.config, ctx.host)? {
                lookups.push(lookup(ctx.config, &location, ctx.host)?);
            }
        }
        if lookups.contains(&Lookup::Unknown) {
            return Ok(Vec::new());
        }
        let set = lookups.iter().filter(|l| l.is_set()).count();
        if set == 1 {
            return Ok(Vec::new());
        }
        Ok(vec![failed(ctx.host, self.description(), format!("{set} set"))])
    }
}

// ---------------------------------------------------------------------------
// Scalar checks
// ---------------------------------------------------------------------------

/// String length limit, counted in characters.
#[derive(Debug, Clone, Copy)]
pub struct LengthAtMost(pub usize);

impl Validator for LengthAtMost {
    fn description(&self) -> String {
        format!("string length must be at most {}", self.0)
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        match ctx.value {
            Lookup::Value(Value::String(s)) if s.chars().count() > self.0 => Ok(vec![failed(
                ctx.host,
                self.description(),
                format!("{} characters", s.chars().count()),
            )]),
            _ => Ok(Vec::new()),
        }
    }
}

/// The host, when set, must be one of `allowed`.
#[derive(Debug, Clone)]
pub struct ValueIsOneOf {
    allowed: Vec<String>,
}

impl ValueIsOneOf {
    pub fn new<I>(allowed: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for ValueIsOneOf {
    fn description(&self) -> String {
        format!("value must be one of: [{}]", self.allowed.join(", "))
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        match ctx.value.value() {
            Some(v) if !self.allowed.iter().any(|a| values_match(v, &Value::String(a.clone()))) => {
                Ok(vec![failed(ctx.host, self.description(), display_value(v))])
            }
            _ => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Definition part arguments
// ---------------------------------------------------------------------------

/// Per-part argument rules: tokens and a non-default delimiter only with
/// template processing, parameters only with parameter processing, and
/// every parameter type must be supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingModeArguments;

impl Validator for ProcessingModeArguments {
    fn description(&self) -> String {
        "tokens and delimiter require Template processing; parameters require Parameters processing".to_string()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Outcome {
        let Lookup::Value(Value::Object(part)) = ctx.value else {
            return Ok(Vec::new());
        };

        let mode = match part.get("processing_mode") {
            None | Some(Value::Null) => ProcessingMode::None,
            Some(v) if crate::path::is_unknown(v) => return Ok(Vec::new()),
            Some(v) => match serde_json::from_value::<ProcessingMode>(v.clone()) {
                Ok(mode) => mode,
                Err(_) => {
                    let allowed: Vec<_> = ProcessingMode::all().iter().map(|m| m.as_str()).collect();
                    return Ok(vec![failed(
                        &ctx.host.child("processing_mode"),
                        format!("value must be one of: [{}]", allowed.join(", ")),
                        display_value(v),
                    )]);
                }
            },
        };

        let non_empty = |key: &str| match part.get(key) {
            Some(Value::Object(m)) => !m.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };

        let mut findings = Vec::new();
        if non_empty("tokens") && mode != ProcessingMode::TemplateSubstitution {
            findings.push(failed(
                &ctx.host.child("tokens"),
                "tokens are only allowed when processing_mode is Template",
                mode.as_str(),
            ));
        }
        if let Some(delimiter) = part.get("delimiter").filter(|d| !d.is_null()) {
            let is_default = serde_json::from_value::<TokensDelimiter>(delimiter.clone())
                .map(|d| d == TokensDelimiter::default())
                .unwrap_or(false);
            if !is_default && mode != ProcessingMode::TemplateSubstitution {
                findings.push(failed(
                    &ctx.host.child("delimiter"),
                    "delimiter is only allowed when processing_mode is Template",
                    display_value(delimiter),
                ));
            }
        }
        if non_empty("parameters") && mode != ProcessingMode::ParameterSubstitution {
            findings.push(failed(
                &ctx.host.child("parameters"),
                "parameters are only allowed when processing_mode is Parameters",
                mode.as_str(),
            ));
        }
        if let Some(Value::Array(rules)) = part.get("parameters") {
            for (i, rule) in rules.iter().enumerate() {
                let Some(kind) = rule.get("type").and_then(Value::as_str) else {
                    continue;
                };
                if let Err(message) = kind.parse::<ParameterKind>() {
                    findings.push(failed(&ctx.host.child("parameters").child(i.to_string()), message, kind));
                }
            }
        }
        Ok(findings)
    }
}
