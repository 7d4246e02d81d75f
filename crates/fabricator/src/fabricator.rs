//! Random record fabricator.
//!
//! The fabricator populates a [`Record`] for a registered shape with random,
//! type-valid values: computed fields are skipped, per-column overrides win
//! over the default kind-based generators, and nested shapes are expanded
//! recursively up to a depth cap so self-referential shapes terminate.

use crate::generators;
use crate::overrides::{OverrideRegistry, TableContext};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use step_core::{FieldKind, FieldSpec, Record, ShapeRegistry, Value};

/// Default nesting depth at which recursive shape expansion stops.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Length used for unconstrained text fields.
const DEFAULT_TEXT_LEN: usize = 12;

/// Upper bound on fabricated object-array lengths.
const MAX_ARRAY_LEN: usize = 3;

/// Magnitude bound for fabricated floats. Uniform draws over the full
/// representable range are dominated by astronomically large values, so
/// floats stay within a wide but finite window.
const FLOAT_MAGNITUDE: f64 = 1.0e9;

/// Error type for fabrication.
#[derive(Debug, thiserror::Error)]
pub enum FabricateError {
    /// The shape is not registered, so no instance can be constructed
    #[error("shape cannot be constructed: no shape registered under '{shape}'")]
    Construction {
        /// The missing shape name
        shape: String,
    },

    /// A field's declared kind admits no generated value
    #[error("field '{field}' of shape '{shape}' cannot be generated: {detail}")]
    UnsupportedType {
        /// Owning shape name
        shape: String,
        /// Offending field name
        field: String,
        /// Why no value can be generated
        detail: String,
    },
}

/// Fabricates random records for registered shapes.
///
/// The fabricator owns a seeded random number generator, so runs with the
/// same seed, shapes, and overrides produce identical records. The shape
/// and override registries are read-only during fabrication.
pub struct Fabricator<'a> {
    shapes: &'a ShapeRegistry,
    overrides: &'a OverrideRegistry,
    rng: StdRng,
    max_depth: usize,
}

impl<'a> Fabricator<'a> {
    /// Create a new fabricator over the given registries with the given
    /// seed.
    pub fn new(shapes: &'a ShapeRegistry, overrides: &'a OverrideRegistry, seed: u64) -> Self {
        Self {
            shapes,
            overrides,
            rng: StdRng::seed_from_u64(seed),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting depth at which recursive shape expansion stops.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fabricate a record for the named shape.
    ///
    /// Every non-computed field receives either its registered override
    /// value (when `context` is given and an override matches) or a default
    /// value appropriate to its kind. Errors propagate immediately; no
    /// partially-populated record is returned.
    pub fn fabricate(
        &mut self,
        shape: &str,
        context: Option<&TableContext>,
    ) -> Result<Record, FabricateError> {
        self.fabricate_at(shape, context, 0)
    }

    fn fabricate_at(
        &mut self,
        shape_name: &str,
        context: Option<&TableContext>,
        depth: usize,
    ) -> Result<Record, FabricateError> {
        let shapes = self.shapes;
        let overrides = self.overrides;
        let shape = shapes
            .get_shape(shape_name)
            .ok_or_else(|| FabricateError::Construction {
                shape: shape_name.to_string(),
            })?;

        let mut record = Record::new(&shape.name);
        for field in &shape.fields {
            if field.computed {
                continue;
            }
            let value = match context.and_then(|ctx| overrides.lookup(ctx, &field.name)) {
                Some(generator) => generator(&mut self.rng),
                None => self.default_value(&shape.name, field, context, depth)?,
            };
            record.set(&field.name, value);
        }
        Ok(record)
    }

    fn default_value(
        &mut self,
        shape_name: &str,
        field: &FieldSpec,
        context: Option<&TableContext>,
        depth: usize,
    ) -> Result<Value, FabricateError> {
        let unsupported = |detail: &str| FabricateError::UnsupportedType {
            shape: shape_name.to_string(),
            field: field.name.clone(),
            detail: detail.to_string(),
        };

        let value = match &field.kind {
            FieldKind::Bool => Value::Bool(self.rng.gen()),
            FieldKind::Int16 => Value::Int16(self.rng.gen()),
            FieldKind::Int32 => Value::Int32(self.rng.gen()),
            FieldKind::Int64 => Value::Int64(self.rng.gen()),
            FieldKind::Float32 => Value::Float32(generators::float_in_range(
                &mut self.rng,
                -FLOAT_MAGNITUDE,
                FLOAT_MAGNITUDE,
            ) as f32),
            FieldKind::Float64 => Value::Float64(generators::float_in_range(
                &mut self.rng,
                -FLOAT_MAGNITUDE,
                FLOAT_MAGNITUDE,
            )),
            FieldKind::Decimal { precision, scale } => Value::Decimal(
                generators::decimal_with_precision(&mut self.rng, *precision, *scale),
            ),
            FieldKind::VarChar { max_length } => {
                if *max_length == 0 {
                    return Err(unsupported("var_char with zero max length"));
                }
                Value::String(generators::random_alphanumeric_bounded(
                    &mut self.rng,
                    *max_length as usize,
                ))
            }
            FieldKind::Text => Value::String(generators::random_alphanumeric(
                &mut self.rng,
                DEFAULT_TEXT_LEN,
            )),
            FieldKind::Date => Value::Date(generators::date_in_window(&mut self.rng)),
            FieldKind::DateTime => Value::DateTime(generators::datetime_in_window(&mut self.rng)),
            FieldKind::Uuid => Value::Uuid(generators::random_uuid(&mut self.rng)),
            FieldKind::Enum { members } => {
                if members.is_empty() {
                    return Err(unsupported("enum with no members"));
                }
                let idx = self.rng.gen_range(0..members.len());
                Value::String(members[idx].clone())
            }
            FieldKind::Object { shape } => {
                if depth >= self.max_depth {
                    Value::Null
                } else {
                    Value::Record(self.fabricate_at(shape, context, depth + 1)?)
                }
            }
            FieldKind::ObjectArray { shape } => {
                if depth >= self.max_depth {
                    Value::Array(Vec::new())
                } else {
                    let len = self.rng.gen_range(0..=MAX_ARRAY_LEN);
                    let mut items = Vec::with_capacity(len);
                    for _ in 0..len {
                        items.push(Value::Record(self.fabricate_at(
                            shape,
                            context,
                            depth + 1,
                        )?));
                    }
                    Value::Array(items)
                }
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_shapes() -> ShapeRegistry {
        ShapeRegistry::from_yaml(
            r#"
shapes:
  - name: account
    fields:
      - name: id
        type: uuid
        computed: true

      - name: name
        type:
          type: var_char
          max_length: 8

      - name: note
        type: text

      - name: balance
        type:
          type: decimal
          precision: 6
          scale: 2

      - name: active
        type: bool

      - name: tier
        type:
          type: enum
          members: ["bronze", "silver", "gold"]

      - name: opened
        type: date_time
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_computed_fields_never_assigned() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..20 {
            let record = fabricator.fabricate("account", None).unwrap();
            assert!(record.get("id").is_none(), "computed field was assigned");
            assert!(record.get("name").is_some());
        }
    }

    #[test]
    fn test_varchar_length_within_bounds() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..100 {
            let record = fabricator.fabricate("account", None).unwrap();
            let name = record.get("name").and_then(Value::as_str).unwrap();
            assert!((1..=8).contains(&name.len()), "bad length: {name:?}");
        }
    }

    #[test]
    fn test_decimal_respects_precision_and_scale() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..100 {
            let record = fabricator.fabricate("account", None).unwrap();
            let balance = record.get("balance").and_then(Value::as_decimal).unwrap();
            assert_eq!(balance.scale(), 2);
            assert!(balance.abs().mantissa() < 1_000_000);
        }
    }

    #[test]
    fn test_enum_picks_declared_members() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..50 {
            let record = fabricator.fabricate("account", None).unwrap();
            let tier = record.get("tier").and_then(Value::as_str).unwrap();
            assert!(["bronze", "silver", "gold"].contains(&tier));
        }
    }

    #[test]
    fn test_override_wins_over_default() {
        let shapes = test_shapes();
        let mut overrides = OverrideRegistry::new();
        overrides.register("main", "dbo", "accounts", "Name", |_| {
            Value::String("A".to_string())
        });

        let ctx = TableContext::new("main", "dbo", "accounts");
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..50 {
            let record = fabricator.fabricate("account", Some(&ctx)).unwrap();
            assert_eq!(record.get("name").and_then(Value::as_str), Some("A"));
        }
    }

    #[test]
    fn test_override_ignored_without_context() {
        let shapes = test_shapes();
        let mut overrides = OverrideRegistry::new();
        overrides.register("main", "dbo", "accounts", "name", |_| {
            Value::String("A".to_string())
        });

        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);
        let mut saw_other = false;
        for _ in 0..50 {
            let record = fabricator.fabricate("account", None).unwrap();
            if record.get("name").and_then(Value::as_str) != Some("A") {
                saw_other = true;
            }
        }
        assert!(saw_other, "default generator never ran");
    }

    #[test]
    fn test_deterministic_under_seed() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();

        let mut fab1 = Fabricator::new(&shapes, &overrides, 7);
        let mut fab2 = Fabricator::new(&shapes, &overrides, 7);

        let r1 = fab1.fabricate("account", None).unwrap();
        let r2 = fab2.fabricate("account", None).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_randomness_actually_exercised() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        let first = fabricator.fabricate("account", None).unwrap();
        let mut all_identical = true;
        for _ in 0..10 {
            if fabricator.fabricate("account", None).unwrap() != first {
                all_identical = false;
            }
        }
        assert!(!all_identical);
    }

    #[test]
    fn test_unknown_shape_is_construction_error() {
        let shapes = test_shapes();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        let result = fabricator.fabricate("phantom", None);
        match result {
            Err(FabricateError::Construction { shape }) => assert_eq!(shape, "phantom"),
            other => panic!("expected Construction, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_enum_is_unsupported() {
        let shapes = ShapeRegistry::from_yaml(
            r#"
shapes:
  - name: broken
    fields:
      - name: kind
        type:
          type: enum
          members: []
"#,
        )
        .unwrap();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        let result = fabricator.fabricate("broken", None);
        assert!(matches!(
            result,
            Err(FabricateError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_self_referential_shape_terminates() {
        let shapes = ShapeRegistry::from_yaml(
            r#"
shapes:
  - name: node
    fields:
      - name: label
        type: text
      - name: child
        type:
          type: object
          shape: node
"#,
        )
        .unwrap();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42).with_max_depth(3);

        let record = fabricator.fabricate("node", None).unwrap();

        // Walk the chain: exactly max_depth nested records, then null
        let mut depth = 0;
        let mut current = &record;
        loop {
            match current.get("child").unwrap() {
                Value::Record(child) => {
                    depth += 1;
                    current = child;
                }
                Value::Null => break,
                other => panic!("unexpected child value: {other:?}"),
            }
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn test_object_array_bounded_length() {
        let shapes = ShapeRegistry::from_yaml(
            r#"
shapes:
  - name: order
    fields:
      - name: lines
        type:
          type: object_array
          shape: line

  - name: line
    fields:
      - name: qty
        type: int
"#,
        )
        .unwrap();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        for _ in 0..50 {
            let record = fabricator.fabricate("order", None).unwrap();
            let lines = record.get("lines").and_then(Value::as_array).unwrap();
            assert!(lines.len() <= 3);
            for line in lines {
                assert!(line.as_record().is_some());
            }
        }
    }

    #[test]
    fn test_nested_shape_missing_is_construction_error() {
        let shapes = ShapeRegistry::from_yaml(
            r#"
shapes:
  - name: order
    fields:
      - name: customer
        type:
          type: object
          shape: customer
"#,
        )
        .unwrap();
        let overrides = OverrideRegistry::new();
        let mut fabricator = Fabricator::new(&shapes, &overrides, 42);

        let result = fabricator.fabricate("order", None);
        assert!(matches!(result, Err(FabricateError::Construction { .. })));
    }
}
