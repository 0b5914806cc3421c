//! Ordered, versioned field declarations.
//!
//! A [`Schema`] is the compiled-in description of one configuration
//! unit: an ordered list of [`ConfigField`]s plus a monotonically
//! increasing version number. It is built once through
//! [`SchemaBuilder`] at module construction and immutable afterwards.
//!
//! Building the schema re-checks every declared default against the
//! field's own constraints, so a malformed default surfaces as a
//! [`SchemaError`] at registration time instead of as a runtime
//! validation failure against some user's file.

use crate::document::{Document, DocumentValue, ScalarValue, VERSION_KEY};
use crate::error::SchemaError;
use crate::field::ConfigField;
use std::collections::HashSet;
use std::fmt::Write as _;

/// An immutable, versioned sequence of field declarations.
pub struct Schema<C> {
    namespace: Option<String>,
    version: u32,
    fields: Vec<ConfigField<C>>,
}

impl<C> Schema<C> {
    /// The compiled-in schema version, compared against the document's
    /// reserved `version` key at load time.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Fields in declaration order.
    pub(crate) fn fields(&self) -> &[ConfigField<C>] {
        &self.fields
    }

    /// The dotted document path addressing `field`: the schema
    /// namespace (when set) joined with the field name.
    pub fn path_of(&self, field: &ConfigField<C>) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", field.name()),
            None => field.name().to_string(),
        }
    }

    /// Renders the commented schema document with every field set to
    /// its default.
    ///
    /// This is the generated "first run" config file and doubles as the
    /// living documentation of the unit: description, bounds and
    /// default are emitted as comments ahead of each definition. The
    /// output re-parses as a [`Document`] that validates cleanly
    /// against this schema.
    ///
    /// Dotted paths become nested YAML sections. Declaration order is
    /// preserved verbatim, never re-sorted; fields sharing a parent
    /// section are guaranteed contiguous by [`SchemaBuilder::build`].
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Schema version of this file. Do not edit.");
        let _ = writeln!(out, "{VERSION_KEY}: {}", self.version);

        let mut open: Vec<String> = Vec::new();
        for field in &self.fields {
            let path = self.path_of(field);
            let segments: Vec<&str> = path.split('.').collect();
            let (parents, basename) = segments.split_at(segments.len() - 1);

            let mut common = 0;
            while common < open.len()
                && common < parents.len()
                && open[common] == parents[common]
            {
                common += 1;
            }
            open.truncate(common);

            out.push('\n');
            for segment in &parents[common..] {
                let indent = "  ".repeat(open.len());
                let _ = writeln!(out, "{indent}{segment}:");
                open.push(segment.to_string());
            }

            let indent = "  ".repeat(open.len());
            field.render(&mut out, &indent, basename[0]);
        }
        out
    }
}

/// Builder for a [`Schema`]; fields keep their declaration order.
pub struct SchemaBuilder<C> {
    namespace: Option<String>,
    version: u32,
    fields: Vec<ConfigField<C>>,
}

impl<C> SchemaBuilder<C> {
    pub fn new(version: u32) -> Self {
        Self {
            namespace: None,
            version,
            fields: Vec::new(),
        }
    }

    /// Prefixes every field path with `namespace`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Appends a field declaration.
    pub fn field(mut self, field: ConfigField<C>) -> Self {
        self.fields.push(field);
        self
    }

    /// Finishes the schema, verifying the declarations themselves.
    ///
    /// Duplicate paths, a field claiming the reserved version key,
    /// defaults that fail their own `check_loadable`, non-finite float
    /// defaults, and interleaved nested sections are all rejected here;
    /// any of them is a bug in the declaring module.
    pub fn build(self) -> Result<Schema<C>, SchemaError> {
        let schema = Schema {
            namespace: self.namespace,
            version: self.version,
            fields: self.fields,
        };

        let mut seen = HashSet::new();
        // Tracks nested sections the way `render` walks them: once a
        // section closes, a later field may not re-open it.
        let mut open: Vec<String> = Vec::new();
        let mut closed: HashSet<String> = HashSet::new();
        for field in schema.fields() {
            let path = schema.path_of(field);
            if path == VERSION_KEY {
                return Err(SchemaError::ReservedPath(path));
            }
            if !seen.insert(path.clone()) {
                return Err(SchemaError::DuplicateField(path));
            }

            let segments: Vec<&str> = path.split('.').collect();
            let parents = &segments[..segments.len() - 1];
            let mut common = 0;
            while common < open.len() && common < parents.len() && open[common] == parents[common]
            {
                common += 1;
            }
            while open.len() > common {
                closed.insert(open.join("."));
                open.pop();
            }
            for segment in &parents[common..] {
                open.push(segment.to_string());
                let prefix = open.join(".");
                if closed.contains(&prefix) {
                    return Err(SchemaError::SplitSection(prefix));
                }
            }

            // Defaults must independently pass the field's own rules.
            let mut probe = Document::new();
            probe.insert(path.clone(), field.default_value());
            if let Some(violation) = field.check_loadable(&probe, &path).into_iter().next() {
                return Err(SchemaError::InvalidDefault {
                    path,
                    reason: violation.reason,
                });
            }

            // NaN and infinities have no plain YAML rendering that
            // round-trips as a float here, so they cannot be defaults.
            let non_finite = match field.default_value() {
                DocumentValue::Float(v) => !v.is_finite(),
                DocumentValue::List(items) => items
                    .iter()
                    .any(|item| matches!(item, ScalarValue::Float(v) if !v.is_finite())),
                _ => false,
            };
            if non_finite {
                return Err(SchemaError::InvalidDefault {
                    path,
                    reason: "non-finite float defaults are not renderable".to_string(),
                });
            }
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Bounds;
    use crate::validate::validate;

    #[derive(Default)]
    struct Target {
        threshold: f64,
        time: i64,
        smooth: bool,
        multipliers: Vec<f64>,
    }

    fn sample_schema() -> Schema<Target> {
        SchemaBuilder::new(2)
            .field(ConfigField::double(
                "sleep_threshold",
                0.5,
                Bounds::new(Some(0.0), Some(1.0)),
                |t: &mut Target, v| t.threshold = v,
                "The percentage of sleeping players required to advance time.",
            ))
            .field(ConfigField::long(
                "time.target",
                1000,
                Bounds::new(Some(0), Some(12000)),
                |t: &mut Target, v| t.time = v,
                "The target time in ticks to advance to.",
            ))
            .field(ConfigField::boolean(
                "time.smooth",
                true,
                |t: &mut Target, v| t.smooth = v,
                "Interpolate the change of time.",
            ))
            .field(ConfigField::double_list(
                "multipliers",
                vec![1.0, 1.5],
                Bounds::new(Some(0.0), None),
                |t: &mut Target, v| t.multipliers = v,
                "Per-stage speed multipliers.",
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_duplicate_field_paths() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::boolean("a", true, |t: &mut Target, v| t.smooth = v, ""))
            .field(ConfigField::boolean("a", false, |t: &mut Target, v| t.smooth = v, ""))
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateField(p)) if p == "a"));
    }

    #[test]
    fn rejects_reserved_version_path() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::long(
                "version",
                1,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .build();
        assert!(matches!(result, Err(SchemaError::ReservedPath(_))));
    }

    #[test]
    fn rejects_default_outside_its_own_bounds() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::long(
                "ticks",
                50,
                Bounds::new(Some(0), Some(10)),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .build();
        assert!(
            matches!(result, Err(SchemaError::InvalidDefault { path, .. }) if path == "ticks")
        );
    }

    #[test]
    fn rejects_non_finite_float_defaults() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::double(
                "ratio",
                f64::NAN,
                Bounds::unbounded(),
                |t: &mut Target, v| t.threshold = v,
                "",
            ))
            .build();
        assert!(
            matches!(result, Err(SchemaError::InvalidDefault { path, .. }) if path == "ratio")
        );

        let result = SchemaBuilder::new(1)
            .field(ConfigField::double_list(
                "levels",
                vec![1.0, f64::INFINITY],
                Bounds::unbounded(),
                |t: &mut Target, v| t.multipliers = v,
                "",
            ))
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidDefault { .. })));
    }

    #[test]
    fn rejects_interleaved_nested_sections() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::long(
                "a.x",
                1,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .field(ConfigField::long(
                "b.y",
                2,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .field(ConfigField::long(
                "a.z",
                3,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .build();
        assert!(matches!(result, Err(SchemaError::SplitSection(s)) if s == "a"));
    }

    #[test]
    fn contiguous_nested_sections_still_build() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::long(
                "a.x",
                1,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .field(ConfigField::long(
                "a.z",
                3,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .field(ConfigField::long(
                "b.y",
                2,
                Bounds::unbounded(),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_enum_default_outside_allowed_set() {
        let result = SchemaBuilder::new(1)
            .field(ConfigField::enumeration(
                "mode",
                "dusk",
                &["day", "night"],
                |_: &mut Target, _| {},
                "",
            ))
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidDefault { .. })));
    }

    #[test]
    fn render_emits_version_then_commented_fields() {
        let out = sample_schema().render();
        assert!(out.starts_with("# Schema version of this file. Do not edit.\nversion: 2\n"));
        assert!(out.contains("# The percentage of sleeping players required to advance time.\n"));
        assert!(out.contains("# Range: [0.0, 1.0]\n"));
        assert!(out.contains("sleep_threshold: 0.5\n"));
        // Dotted paths become nested sections.
        assert!(out.contains("time:\n"));
        assert!(out.contains("  target: 1000\n"));
        assert!(out.contains("  smooth: true\n"));
    }

    #[test]
    fn rendered_defaults_reparse_and_validate_cleanly() {
        let schema = sample_schema();
        let doc = Document::parse_str(&schema.render()).unwrap();

        assert_eq!(doc.version(), Some(2));
        assert!(validate(&doc, &schema).is_empty());
    }

    #[test]
    fn string_defaults_with_yaml_indicators_round_trip() {
        #[derive(Default)]
        struct Strings {
            motd: String,
            tags: Vec<String>,
        }

        let schema: Schema<Strings> = SchemaBuilder::new(1)
            .field(ConfigField::string(
                "motd",
                "[maintenance] back soon: really",
                |t: &mut Strings, v| t.motd = v,
                "Message of the day.",
            ))
            .field(ConfigField::string_list(
                "tags",
                &["*starred", "{braced", "- dashed"],
                |t: &mut Strings, v| t.tags = v,
                "Tags.",
            ))
            .build()
            .unwrap();

        let doc = Document::parse_str(&schema.render()).unwrap();
        assert!(validate(&doc, &schema).is_empty());

        let mut target = Strings::default();
        crate::bind(&doc, &schema, &mut target);
        assert_eq!(target.motd, "[maintenance] back soon: really");
        assert_eq!(target.tags, vec!["*starred", "{braced", "- dashed"]);
    }

    #[test]
    fn namespaced_schema_round_trips() {
        let schema = SchemaBuilder::new(1)
            .namespace("bedtime")
            .field(ConfigField::double(
                "sleep_threshold",
                0.5,
                Bounds::new(Some(0.0), Some(1.0)),
                |t: &mut Target, v| t.threshold = v,
                "Threshold.",
            ))
            .build()
            .unwrap();

        let rendered = schema.render();
        let doc = Document::parse_str(&rendered).unwrap();
        assert!(doc.contains("bedtime.sleep_threshold"));
        assert!(validate(&doc, &schema).is_empty());
    }
}
