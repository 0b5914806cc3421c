//! Parsed configuration documents.
//!
//! A [`Document`] is the generic shape of one parsed config file: an
//! ordered mapping from dotted path strings to scalar or list values.
//! It carries no object identity and is produced fresh on every load
//! attempt, then discarded after binding.

use crate::error::ConfigError;
use indexmap::IndexMap;
use std::fmt;

/// Reserved top-level key holding the document's schema version.
pub const VERSION_KEY: &str = "version";

/// A scalar primitive as it appears in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    /// Human-readable name of this scalar's primitive type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "boolean",
            ScalarValue::Int(_) => "integer",
            ScalarValue::Float(_) => "float",
            ScalarValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            // Debug formatting keeps the decimal point, so a float
            // round-trips as a float instead of collapsing to an integer.
            ScalarValue::Float(v) => write!(f, "{v:?}"),
            ScalarValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// A value addressable by one dotted path: a scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ScalarValue>),
}

impl DocumentValue {
    /// Human-readable name of this value's shape, used in violation reasons.
    pub fn type_name(&self) -> &'static str {
        match self {
            DocumentValue::Bool(_) => "boolean",
            DocumentValue::Int(_) => "integer",
            DocumentValue::Float(_) => "float",
            DocumentValue::Str(_) => "string",
            DocumentValue::List(_) => "list",
        }
    }
}

impl From<bool> for DocumentValue {
    fn from(v: bool) -> Self {
        DocumentValue::Bool(v)
    }
}

impl From<i64> for DocumentValue {
    fn from(v: i64) -> Self {
        DocumentValue::Int(v)
    }
}

impl From<f64> for DocumentValue {
    fn from(v: f64) -> Self {
        DocumentValue::Float(v)
    }
}

impl From<&str> for DocumentValue {
    fn from(v: &str) -> Self {
        DocumentValue::Str(v.to_string())
    }
}

impl From<String> for DocumentValue {
    fn from(v: String) -> Self {
        DocumentValue::Str(v)
    }
}

impl From<Vec<ScalarValue>> for DocumentValue {
    fn from(v: Vec<ScalarValue>) -> Self {
        DocumentValue::List(v)
    }
}

impl From<ScalarValue> for DocumentValue {
    fn from(v: ScalarValue) -> Self {
        match v {
            ScalarValue::Bool(v) => DocumentValue::Bool(v),
            ScalarValue::Int(v) => DocumentValue::Int(v),
            ScalarValue::Float(v) => DocumentValue::Float(v),
            ScalarValue::Str(v) => DocumentValue::Str(v),
        }
    }
}

/// An ordered mapping from dotted paths to values, parsed from one
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    values: IndexMap<String, DocumentValue>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses YAML text into a flattened document.
    ///
    /// Nested mappings become dotted paths (`world: { time: 5 }` turns
    /// into `world.time`); sequences of scalars are kept as list values.
    /// Non-string keys and nested sequence elements have no dotted-path
    /// representation and are rejected as structure errors.
    pub fn parse_str(text: &str) -> Result<Self, ConfigError> {
        let root: serde_yaml::Value = serde_yaml::from_str(text)?;
        let mut doc = Document::new();
        match root {
            // An empty or comment-only file is an empty document.
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(mapping) => {
                flatten_mapping(&mut doc, String::new(), mapping)?;
            }
            other => {
                return Err(ConfigError::Structure(format!(
                    "top level must be a mapping, found {}",
                    yaml_type_name(&other)
                )));
            }
        }
        Ok(doc)
    }

    /// Sets the value at `path`, replacing any previous value.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<DocumentValue>) {
        self.values.insert(path.into(), value.into());
    }

    /// Returns the value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&DocumentValue> {
        self.values.get(path)
    }

    /// Returns whether `path` is present.
    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// Returns the declared schema version, if the reserved key holds an integer.
    pub fn version(&self) -> Option<i64> {
        match self.get(VERSION_KEY) {
            Some(DocumentValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Number of paths in the document.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the document has no paths at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn flatten_mapping(
    doc: &mut Document,
    prefix: String,
    mapping: serde_yaml::Mapping,
) -> Result<(), ConfigError> {
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(ConfigError::Structure(format!(
                    "non-string key {} under '{prefix}'",
                    yaml_type_name(&other)
                )));
            }
        };
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            serde_yaml::Value::Mapping(nested) => flatten_mapping(doc, path, nested)?,
            serde_yaml::Value::Sequence(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match convert_scalar(item) {
                        Some(scalar) => list.push(scalar),
                        None => {
                            return Err(ConfigError::Structure(format!(
                                "list element {index} at '{path}' is not a scalar"
                            )));
                        }
                    }
                }
                doc.values.insert(path, DocumentValue::List(list));
            }
            scalar => {
                let scalar = convert_scalar(scalar).ok_or_else(|| {
                    ConfigError::Structure(format!("unsupported value at '{path}'"))
                })?;
                doc.values.insert(path, DocumentValue::from(scalar));
            }
        }
    }
    Ok(())
}

fn convert_scalar(value: serde_yaml::Value) -> Option<ScalarValue> {
    match value {
        serde_yaml::Value::Bool(v) => Some(ScalarValue::Bool(v)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(ScalarValue::Int(i))
            } else {
                n.as_f64().map(ScalarValue::Float)
            }
        }
        serde_yaml::Value::String(s) => Some(ScalarValue::Str(s)),
        _ => None,
    }
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}
