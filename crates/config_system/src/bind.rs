//! Committing a validated document onto a target object.

use crate::schema::Schema;
use crate::Document;

/// Assigns each field's resolved value onto `target`, in declaration
/// order.
///
/// # Precondition
///
/// `doc` must already have produced an empty
/// [`ValidationReport`](crate::ValidationReport) from
/// [`validate`](crate::validate) for this exact `schema`. Binding
/// trusts that and performs no re-validation: callers who skip
/// validation can observe a panic ("this is a bug") instead of an
/// error, because that situation is a contract violation by the
/// caller, not a user data error.
///
/// Given the precondition, binding always terminates and leaves the
/// target fully populated; absent optional fields are filled with
/// their declared defaults.
pub fn bind<C>(doc: &Document, schema: &Schema<C>, target: &mut C) {
    for field in schema.fields() {
        let path = schema.path_of(field);
        field.load(doc, &path, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Bounds, ConfigField};
    use crate::schema::SchemaBuilder;
    use crate::validate::validate;

    #[derive(Debug, Default, PartialEq)]
    struct Target {
        threshold: f64,
        time: i64,
        mode: String,
        levels: Vec<i64>,
    }

    fn schema() -> Schema<Target> {
        SchemaBuilder::new(1)
            .field(ConfigField::double(
                "threshold",
                0.5,
                Bounds::new(Some(0.0), Some(1.0)),
                |t: &mut Target, v| t.threshold = v,
                "",
            ))
            .field(ConfigField::long(
                "time",
                1000,
                Bounds::new(Some(0), Some(12000)),
                |t: &mut Target, v| t.time = v,
                "",
            ))
            .field(ConfigField::enumeration(
                "mode",
                "day",
                &["day", "night"],
                |t: &mut Target, v| t.mode = v,
                "",
            ))
            .field(ConfigField::long_list(
                "levels",
                vec![1, 2],
                Bounds::new(Some(0), None),
                |t: &mut Target, v| t.levels = v,
                "",
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn binds_every_field_from_a_clean_document() {
        let doc = Document::parse_str(
            "threshold: 0.25\ntime: 600\nmode: night\nlevels:\n  - 3\n  - 4\n",
        )
        .unwrap();
        let schema = schema();
        assert!(validate(&doc, &schema).is_empty());

        let mut target = Target::default();
        bind(&doc, &schema, &mut target);

        assert_eq!(
            target,
            Target {
                threshold: 0.25,
                time: 600,
                mode: "night".to_string(),
                levels: vec![3, 4],
            }
        );
    }

    #[test]
    fn fills_absent_optional_fields_with_defaults() {
        let doc = Document::parse_str("threshold: 0.75\n").unwrap();
        let schema = schema();
        assert!(validate(&doc, &schema).is_empty());

        let mut target = Target::default();
        bind(&doc, &schema, &mut target);

        assert_eq!(target.threshold, 0.75);
        assert_eq!(target.time, 1000);
        assert_eq!(target.mode, "day");
        assert_eq!(target.levels, vec![1, 2]);
    }

    #[test]
    fn empty_document_binds_all_defaults() {
        let doc = Document::new();
        let schema = schema();
        assert!(validate(&doc, &schema).is_empty());

        let mut target = Target::default();
        bind(&doc, &schema, &mut target);

        assert_eq!(
            target,
            Target {
                threshold: 0.5,
                time: 1000,
                mode: "day".to_string(),
                levels: vec![1, 2],
            }
        );
    }
}
