//! The configurable field family.
//!
//! A [`ConfigField`] describes one configurable value: its name, typed
//! default, optional numeric bounds or allowed-value set, description,
//! and the setter that commits a validated value onto the owning
//! module's config struct. The setter is a plain `fn` pointer captured
//! at declaration time, so no dynamic member lookup happens anywhere.
//!
//! Each field knows how to render its commented default
//! ([`ConfigField::render`]), how to verify a parsed document
//! ([`ConfigField::check_loadable`]), and how to commit the value
//! ([`ConfigField::load`]). `load` must not fail: every failure mode is
//! expected to have been caught by `check_loadable`, and a mismatch
//! discovered during `load` is a framework bug, not a user data error.

use crate::document::{Document, DocumentValue, ScalarValue};
use crate::validate::Violation;
use std::fmt::Write as _;

/// Inclusive numeric bounds; `None` on a side means unbounded there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// No constraint on either side.
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Whether `value` satisfies both inclusive bounds.
    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// The closed set of field kinds, each carrying its typed default,
/// constraints, and setter.
pub enum FieldKind<C> {
    Bool {
        default: bool,
        set: fn(&mut C, bool),
    },
    Long {
        default: i64,
        bounds: Bounds<i64>,
        set: fn(&mut C, i64),
    },
    Double {
        default: f64,
        bounds: Bounds<f64>,
        set: fn(&mut C, f64),
    },
    Str {
        default: String,
        set: fn(&mut C, String),
    },
    Enum {
        default: String,
        allowed: Vec<String>,
        set: fn(&mut C, String),
    },
    LongList {
        default: Vec<i64>,
        bounds: Bounds<i64>,
        set: fn(&mut C, Vec<i64>),
    },
    DoubleList {
        default: Vec<f64>,
        bounds: Bounds<f64>,
        set: fn(&mut C, Vec<f64>),
    },
    StrList {
        default: Vec<String>,
        set: fn(&mut C, Vec<String>),
    },
}

/// One configurable value owned by a schema.
pub struct ConfigField<C> {
    name: String,
    description: String,
    required: bool,
    kind: FieldKind<C>,
}

impl<C> ConfigField<C> {
    /// Declares a boolean field.
    pub fn boolean(
        name: impl Into<String>,
        default: bool,
        set: fn(&mut C, bool),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(name, description, FieldKind::Bool { default, set })
    }

    /// Declares an integer field with optional inclusive bounds.
    pub fn long(
        name: impl Into<String>,
        default: i64,
        bounds: Bounds<i64>,
        set: fn(&mut C, i64),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::Long {
                default,
                bounds,
                set,
            },
        )
    }

    /// Declares a float field with optional inclusive bounds.
    pub fn double(
        name: impl Into<String>,
        default: f64,
        bounds: Bounds<f64>,
        set: fn(&mut C, f64),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::Double {
                default,
                bounds,
                set,
            },
        )
    }

    /// Declares a free-form string field.
    pub fn string(
        name: impl Into<String>,
        default: impl Into<String>,
        set: fn(&mut C, String),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::Str {
                default: default.into(),
                set,
            },
        )
    }

    /// Declares a string field restricted to a fixed set of values.
    pub fn enumeration(
        name: impl Into<String>,
        default: impl Into<String>,
        allowed: &[&str],
        set: fn(&mut C, String),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::Enum {
                default: default.into(),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
                set,
            },
        )
    }

    /// Declares a list-of-integers field; bounds apply per element.
    pub fn long_list(
        name: impl Into<String>,
        default: Vec<i64>,
        bounds: Bounds<i64>,
        set: fn(&mut C, Vec<i64>),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::LongList {
                default,
                bounds,
                set,
            },
        )
    }

    /// Declares a list-of-floats field; bounds apply per element.
    pub fn double_list(
        name: impl Into<String>,
        default: Vec<f64>,
        bounds: Bounds<f64>,
        set: fn(&mut C, Vec<f64>),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::DoubleList {
                default,
                bounds,
                set,
            },
        )
    }

    /// Declares a list-of-strings field.
    pub fn string_list(
        name: impl Into<String>,
        default: &[&str],
        set: fn(&mut C, Vec<String>),
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            description,
            FieldKind::StrList {
                default: default.iter().map(|s| s.to_string()).collect(),
                set,
            },
        )
    }

    fn with_kind(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: FieldKind<C>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            kind,
        }
    }

    /// Marks the field as required: absence becomes a violation instead
    /// of falling back to the default at bind time.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Human-readable kind name, used in violation reasons.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            FieldKind::Bool { .. } => "boolean",
            FieldKind::Long { .. } => "integer",
            FieldKind::Double { .. } => "double",
            FieldKind::Str { .. } => "string",
            FieldKind::Enum { .. } => "enum",
            FieldKind::LongList { .. } => "integer list",
            FieldKind::DoubleList { .. } => "double list",
            FieldKind::StrList { .. } => "string list",
        }
    }

    /// The declared default as a document value, used for the
    /// registration-time self-check and for rendering.
    pub(crate) fn default_value(&self) -> DocumentValue {
        match &self.kind {
            FieldKind::Bool { default, .. } => DocumentValue::Bool(*default),
            FieldKind::Long { default, .. } => DocumentValue::Int(*default),
            FieldKind::Double { default, .. } => DocumentValue::Float(*default),
            FieldKind::Str { default, .. } | FieldKind::Enum { default, .. } => {
                DocumentValue::Str(default.clone())
            }
            FieldKind::LongList { default, .. } => {
                DocumentValue::List(default.iter().map(|v| ScalarValue::Int(*v)).collect())
            }
            FieldKind::DoubleList { default, .. } => {
                DocumentValue::List(default.iter().map(|v| ScalarValue::Float(*v)).collect())
            }
            FieldKind::StrList { default, .. } => DocumentValue::List(
                default.iter().map(|v| ScalarValue::Str(v.clone())).collect(),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Writes the commented schema fragment for this field: description,
    /// bounds or allowed values when present, the default, and finally
    /// the definition itself, re-parseable as YAML.
    pub(crate) fn render(&self, out: &mut String, indent: &str, basename: &str) {
        for line in self.description.lines() {
            let _ = writeln!(out, "{indent}# {line}");
        }
        self.render_constraints(out, indent);
        match self.default_value() {
            DocumentValue::List(items) => {
                if items.is_empty() {
                    let _ = writeln!(out, "{indent}# Default: []");
                    let _ = writeln!(out, "{indent}{basename}: []");
                } else {
                    let _ = writeln!(out, "{indent}# Default:");
                    for item in &items {
                        let _ = writeln!(out, "{indent}#   - {}", render_list_item(item));
                    }
                    let _ = writeln!(out, "{indent}{basename}:");
                    for item in &items {
                        let _ = writeln!(out, "{indent}  - {}", render_list_item(item));
                    }
                }
            }
            scalar => {
                let rendered = render_scalar(&scalar);
                let _ = writeln!(out, "{indent}# Default: {rendered}");
                let _ = writeln!(out, "{indent}{basename}: {rendered}");
            }
        }
    }

    fn render_constraints(&self, out: &mut String, indent: &str) {
        match &self.kind {
            FieldKind::Long { bounds, .. } | FieldKind::LongList { bounds, .. } => {
                render_bounds(out, indent, bounds.min.map(fmt_i64), bounds.max.map(fmt_i64));
            }
            FieldKind::Double { bounds, .. } | FieldKind::DoubleList { bounds, .. } => {
                render_bounds(out, indent, bounds.min.map(fmt_f64), bounds.max.map(fmt_f64));
            }
            FieldKind::Enum { allowed, .. } => {
                let _ = writeln!(out, "{indent}# Allowed values: {}", allowed.join(", "));
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Verifies that the value at `path` (if any) could be loaded:
    /// presence when required, primitive shape, and bounds or membership.
    /// List kinds check every element and report one violation per
    /// offending element, addressed as `path[index]`.
    pub(crate) fn check_loadable(&self, doc: &Document, path: &str) -> Vec<Violation> {
        let value = match doc.get(path) {
            Some(value) => value,
            None => {
                if self.required {
                    return vec![Violation::missing(
                        path,
                        format!("required key is missing (expected {})", self.kind_name()),
                    )];
                }
                return Vec::new();
            }
        };

        match &self.kind {
            FieldKind::Bool { .. } => match value {
                DocumentValue::Bool(_) => Vec::new(),
                other => vec![type_violation(path, "boolean", other)],
            },
            FieldKind::Long { bounds, .. } => match value {
                DocumentValue::Int(v) => check_long_range(path, *v, bounds).into_iter().collect(),
                other => vec![type_violation(path, "integer", other)],
            },
            FieldKind::Double { bounds, .. } => match value {
                DocumentValue::Float(v) => {
                    check_double_range(path, *v, bounds).into_iter().collect()
                }
                // Integers widen to double.
                DocumentValue::Int(v) => check_double_range(path, *v as f64, bounds)
                    .into_iter()
                    .collect(),
                other => vec![type_violation(path, "double", other)],
            },
            FieldKind::Str { .. } => match value {
                DocumentValue::Str(_) => Vec::new(),
                other => vec![type_violation(path, "string", other)],
            },
            FieldKind::Enum { allowed, .. } => match value {
                DocumentValue::Str(s) => {
                    if allowed.iter().any(|a| a == s) {
                        Vec::new()
                    } else {
                        vec![Violation::not_allowed(
                            path,
                            format!("value '{s}' must be one of: {}", allowed.join(", ")),
                        )]
                    }
                }
                other => vec![type_violation(path, "string", other)],
            },
            FieldKind::LongList { bounds, .. } => {
                check_list(path, value, "integer", |element_path, item| match item {
                    ScalarValue::Int(v) => check_long_range(element_path, *v, bounds),
                    other => Some(element_type_violation(element_path, "integer", other)),
                })
            }
            FieldKind::DoubleList { bounds, .. } => {
                check_list(path, value, "double", |element_path, item| match item {
                    ScalarValue::Float(v) => check_double_range(element_path, *v, bounds),
                    ScalarValue::Int(v) => check_double_range(element_path, *v as f64, bounds),
                    other => Some(element_type_violation(element_path, "double", other)),
                })
            }
            FieldKind::StrList { .. } => {
                check_list(path, value, "string", |element_path, item| match item {
                    ScalarValue::Str(_) => None,
                    other => Some(element_type_violation(element_path, "string", other)),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Reads the already-validated value at `path` (or the default when
    /// absent) and commits it onto `target`.
    ///
    /// # Panics
    ///
    /// Panics if the value's shape contradicts what validation accepted.
    /// That can only happen when the binder contract was violated
    /// (binding an unvalidated or mismatched-schema document), which is
    /// a bug in the caller, not a user data error.
    pub(crate) fn load(&self, doc: &Document, path: &str, target: &mut C) {
        let value = doc.get(path);
        match &self.kind {
            FieldKind::Bool { default, set } => {
                let v = match value {
                    None => *default,
                    Some(DocumentValue::Bool(v)) => *v,
                    Some(other) => bug(path, "boolean", other),
                };
                set(target, v);
            }
            FieldKind::Long { default, set, .. } => {
                let v = match value {
                    None => *default,
                    Some(DocumentValue::Int(v)) => *v,
                    Some(other) => bug(path, "integer", other),
                };
                set(target, v);
            }
            FieldKind::Double { default, set, .. } => {
                let v = match value {
                    None => *default,
                    Some(DocumentValue::Float(v)) => *v,
                    Some(DocumentValue::Int(v)) => *v as f64,
                    Some(other) => bug(path, "double", other),
                };
                set(target, v);
            }
            FieldKind::Str { default, set } | FieldKind::Enum { default, set, .. } => {
                let v = match value {
                    None => default.clone(),
                    Some(DocumentValue::Str(v)) => v.clone(),
                    Some(other) => bug(path, "string", other),
                };
                set(target, v);
            }
            FieldKind::LongList { default, set, .. } => {
                let v = match value {
                    None => default.clone(),
                    Some(DocumentValue::List(items)) => items
                        .iter()
                        .map(|item| match item {
                            ScalarValue::Int(v) => *v,
                            other => bug_scalar(path, "integer", other),
                        })
                        .collect(),
                    Some(other) => bug(path, "integer list", other),
                };
                set(target, v);
            }
            FieldKind::DoubleList { default, set, .. } => {
                let v = match value {
                    None => default.clone(),
                    Some(DocumentValue::List(items)) => items
                        .iter()
                        .map(|item| match item {
                            ScalarValue::Float(v) => *v,
                            ScalarValue::Int(v) => *v as f64,
                            other => bug_scalar(path, "double", other),
                        })
                        .collect(),
                    Some(other) => bug(path, "double list", other),
                };
                set(target, v);
            }
            FieldKind::StrList { default, set } => {
                let v = match value {
                    None => default.clone(),
                    Some(DocumentValue::List(items)) => items
                        .iter()
                        .map(|item| match item {
                            ScalarValue::Str(v) => v.clone(),
                            other => bug_scalar(path, "string", other),
                        })
                        .collect(),
                    Some(other) => bug(path, "string list", other),
                };
                set(target, v);
            }
        }
    }
}

fn render_bounds(out: &mut String, indent: &str, min: Option<String>, max: Option<String>) {
    match (min, max) {
        (Some(min), Some(max)) => {
            let _ = writeln!(out, "{indent}# Range: [{min}, {max}]");
        }
        (Some(min), None) => {
            let _ = writeln!(out, "{indent}# Range: >= {min}");
        }
        (None, Some(max)) => {
            let _ = writeln!(out, "{indent}# Range: <= {max}");
        }
        (None, None) => {}
    }
}

fn render_list_item(item: &ScalarValue) -> String {
    match item {
        ScalarValue::Str(s) => quote_yaml_string(s),
        other => other.to_string(),
    }
}

fn render_scalar(value: &DocumentValue) -> String {
    match value {
        DocumentValue::Bool(v) => v.to_string(),
        DocumentValue::Int(v) => v.to_string(),
        DocumentValue::Float(v) => fmt_f64(*v),
        DocumentValue::Str(v) => quote_yaml_string(v),
        DocumentValue::List(_) => unreachable!("lists are rendered as blocks"),
    }
}

/// Quotes a string when bare YAML would reinterpret it (numbers,
/// booleans, empties, leading/trailing whitespace, reserved characters,
/// or a leading indicator character such as `[`, `{`, `*` or `-`).
fn quote_yaml_string(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.parse::<i64>().is_ok()
        || s.parse::<f64>().is_ok()
        || matches!(s, "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off")
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.starts_with(|c: char| "-?,[]{}&*!|>%@`".contains(c))
        || s.contains(|c| matches!(c, ':' | '#' | '\'' | '"' | '\n'));
    if needs_quotes {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

fn fmt_i64(v: i64) -> String {
    v.to_string()
}

fn fmt_f64(v: f64) -> String {
    format!("{v:?}")
}

fn type_violation(path: &str, expected: &str, found: &DocumentValue) -> Violation {
    Violation::wrong_type(path, format!("expected {expected}, found {}", found.type_name()))
}

fn element_type_violation(path: &str, expected: &str, found: &ScalarValue) -> Violation {
    Violation::wrong_type(path, format!("expected {expected}, found {}", found.type_name()))
}

fn check_long_range(path: &str, value: i64, bounds: &Bounds<i64>) -> Option<Violation> {
    if let Some(min) = bounds.min {
        if value < min {
            return Some(Violation::out_of_range(
                path,
                format!("value {value} is below min {min}"),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if value > max {
            return Some(Violation::out_of_range(
                path,
                format!("value {value} exceeds max {max}"),
            ));
        }
    }
    None
}

fn check_double_range(path: &str, value: f64, bounds: &Bounds<f64>) -> Option<Violation> {
    if let Some(min) = bounds.min {
        if value < min {
            return Some(Violation::out_of_range(
                path,
                format!("value {} is below min {}", fmt_f64(value), fmt_f64(min)),
            ));
        }
    }
    if let Some(max) = bounds.max {
        if value > max {
            return Some(Violation::out_of_range(
                path,
                format!("value {} exceeds max {}", fmt_f64(value), fmt_f64(max)),
            ));
        }
    }
    None
}

fn check_list(
    path: &str,
    value: &DocumentValue,
    element_kind: &str,
    mut check_element: impl FnMut(&str, &ScalarValue) -> Option<Violation>,
) -> Vec<Violation> {
    let items = match value {
        DocumentValue::List(items) => items,
        other => {
            return vec![Violation::wrong_type(
                path,
                format!("expected list of {element_kind}s, found {}", other.type_name()),
            )];
        }
    };
    let mut violations = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let element_path = format!("{path}[{index}]");
        if let Some(violation) = check_element(&element_path, item) {
            violations.push(violation);
        }
    }
    violations
}

fn bug(path: &str, expected: &str, found: &DocumentValue) -> ! {
    panic!(
        "config value at '{path}' is not a {expected} ({}) after validation; this is a bug",
        found.type_name()
    )
}

fn bug_scalar(path: &str, expected: &str, found: &ScalarValue) -> ! {
    panic!(
        "config list element at '{path}' is not a {expected} ({}) after validation; this is a bug",
        found.type_name()
    )
}
