//! Attribute locations inside a configuration tree.
//!
//! The tree is a `serde_json::Value`. A string equal to [`UNKNOWN`] marks a
//! value that is not known yet at plan time.
//!
//! Expressions separate keys with `.`; `..` segments are separated by `/`:
//! - `format`: root-relative key
//! - `../format`: relative to the host attribute, one level up
//! - `definition.parts.*`: every key of a map

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ValidationError;

/// Placeholder for values not known until apply time.
pub const UNKNOWN: &str = "${unknown}";

pub fn is_unknown(value: &Value) -> bool {
    value.as_str() == Some(UNKNOWN)
}

// ---------------------------------------------------------------------------
// Concrete paths
// ---------------------------------------------------------------------------

/// A concrete location: a sequence of object keys from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttrPath(Vec<String>);

impl AttrPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        steps.push(key.into());
        Self(steps)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            let plain = !key.is_empty()
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            match (plain, i) {
                (true, 0) => write!(f, "{key}")?,
                (true, _) => write!(f, ".{key}")?,
                (false, _) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

impl From<&[&str]> for AttrPath {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Result of reading a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Absent or explicitly null.
    Null,
    /// Marked unknown.
    Unknown,
    Value(&'a Value),
}

impl<'a> Lookup<'a> {
    pub fn is_set(&self) -> bool {
        !matches!(self, Lookup::Null)
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Lookup::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Read `path` from `root`.
///
/// Missing keys and null intermediates read as [`Lookup::Null`]; stepping
/// into a scalar or array is an [`ValidationError::UnreadableAttribute`].
pub fn lookup<'a>(root: &'a Value, path: &AttrPath, host: &AttrPath) -> Result<Lookup<'a>, ValidationError> {
    let mut current = root;
    for key in path.keys() {
        if is_unknown(current) {
            return Ok(Lookup::Unknown);
        }
        current = match current {
            Value::Null => return Ok(Lookup::Null),
            Value::Object(map) => match map.get(key) {
                Some(v) => v,
                None => return Ok(Lookup::Null),
            },
            _ => {
                return Err(ValidationError::UnreadableAttribute {
                    attribute: host.to_string(),
                    path: path.to_string(),
                })
            }
        };
    }
    Ok(match current {
        Value::Null => Lookup::Null,
        v if is_unknown(v) => Lookup::Unknown,
        v => Lookup::Value(v),
    })
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    AnyKey,
    Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Root,
    Host,
}

/// A possibly relative, possibly wildcard location expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrExpr {
    anchor: Anchor,
    steps: Vec<Step>,
    source: String,
}

impl AttrExpr {
    /// Root-relative expression, e.g. `definition.format`.
    pub fn root(expr: &str) -> Self {
        Self::parse(Anchor::Root, expr)
    }

    /// Host-relative expression, e.g. `../format`.
    pub fn relative(expr: &str) -> Self {
        Self::parse(Anchor::Host, expr)
    }

    fn parse(anchor: Anchor, expr: &str) -> Self {
        let mut steps = Vec::new();
        for segment in expr.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." {
                steps.push(Step::Parent);
                continue;
            }
            steps.extend(segment.split('.').filter(|s| !s.is_empty()).map(|s| match s {
                "*" => Step::AnyKey,
                key => Step::Key(key.to_string()),
            }));
        }
        Self {
            anchor,
            steps,
            source: expr.to_string(),
        }
    }

    /// Expand to every concrete location this expression names.
    ///
    /// Stepping above the root or enumerating a non-map yields nothing.
    pub fn resolve(&self, root: &Value, host: &AttrPath) -> Result<Vec<AttrPath>, ValidationError> {
        let start = match self.anchor {
            Anchor::Root => AttrPath::root(),
            Anchor::Host => host.clone(),
        };
        let mut frontier = vec![start];
        for step in &self.steps {
            let mut next = Vec::new();
            for path in frontier {
                match step {
                    Step::Key(key) => next.push(path.child(key.clone())),
                    Step::Parent => next.extend(path.parent()),
                    Step::AnyKey => {
                        if let Lookup::Value(Value::Object(map)) = lookup(root, &path, host)? {
                            next.extend(map.keys().map(|k| path.child(k.clone())));
                        }
                    }
                }
            }
            frontier = next;
        }
        Ok(frontier)
    }
}

impl fmt::Display for AttrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for AttrExpr {
    type Err = std::convert::Infallible;

    /// `..`-prefixed expressions are host-relative; everything else is rooted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.starts_with("..") {
            Self::relative(s)
        } else {
            Self::root(s)
        })
    }
}
