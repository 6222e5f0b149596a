//! JSON schema of the configuration file.
//!
//! schemars emits draft 2020-12. Editors that only understand draft-07 get a
//! rewritten copy:
//! - `$defs` → `definitions`, with references updated
//! - two-branch `anyOf` with `null` collapsed to the non-null branch

use schemars::schema_for;
use serde_json::{Map, Value};

use automvs_core::AutomationConfig;

/// Schema of [`AutomationConfig`].
pub fn config_schema(draft07: bool) -> Value {
    let schema = schema_for!(AutomationConfig).to_value();
    if draft07 {
        SchemaTransformer::transform(schema)
    } else {
        schema
    }
}

/// Draft 2020-12 to draft-07 rewriting.
pub struct SchemaTransformer;

impl SchemaTransformer {
    /// Rewrite `schema` for draft-07 consumers.
    pub fn transform(mut schema: Value) -> Value {
        if let Value::Object(obj) = &mut schema {
            if let Some(defs) = obj.remove("$defs") {
                obj.insert("definitions".to_string(), defs);
            }
            if let Some(Value::String(dialect)) = obj.get_mut("$schema") {
                *dialect = "http://json-schema.org/draft-07/schema#".to_string();
            }
        }
        Self::rewrite(&mut schema);
        schema
    }

    fn rewrite(value: &mut Value) {
        match value {
            Value::Object(obj) => {
                Self::collapse_nullable(obj);
                for (key, val) in obj.iter_mut() {
                    match (key.as_str(), val) {
                        ("$ref", Value::String(reference)) => {
                            if let Some(name) = reference.strip_prefix("#/$defs/") {
                                *reference = format!("#/definitions/{name}");
                            }
                        }
                        (_, nested) => Self::rewrite(nested),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(Self::rewrite),
            _ => {}
        }
    }

    /// `{"anyOf": [X, {"type": "null"}]}` becomes X.
    fn collapse_nullable(obj: &mut Map<String, Value>) {
        let Some(Value::Array(branches)) = obj.get("anyOf") else {
            return;
        };
        if branches.len() != 2 {
            return;
        }
        let keep = match (Self::is_bare_null(&branches[0]), Self::is_bare_null(&branches[1])) {
            (false, true) => branches[0].clone(),
            (true, false) => branches[1].clone(),
            _ => return,
        };
        if let Value::Object(fields) = keep {
            obj.remove("anyOf");
            obj.extend(fields);
        }
    }

    fn is_bare_null(schema: &Value) -> bool {
        schema
            .as_object()
            .is_some_and(|o| o.len() == 1 && o.get("type").and_then(Value::as_str) == Some("null"))
    }
}
