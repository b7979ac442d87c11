//! Logic behind the `formbind-bind` binary.
//!
//! Input document: `{"template": [FieldDef...], "record": {...}}`.
//! Output: `{"fields": [{"name", "value"}...], "defaults": {...}, "warnings": [...]}`.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::registry::{render_template, FieldDef, FieldRegistry};
use crate::walker::{collect_bindings, BindScope};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct BindDocument {
    template: Vec<FieldDef>,
    #[serde(default)]
    record: Option<Value>,
}

/// Binds the template of `input` against its record and reports the result.
pub fn bind_document(input: &str, registry: &FieldRegistry) -> Result<String, CliError> {
    let doc: BindDocument = serde_json::from_str(input)?;
    let scope = BindScope::new(doc.record.as_ref());
    let rendered = render_template(&doc.template, &scope, registry);
    let fields: Vec<Value> = collect_bindings(&rendered.nodes)
        .into_iter()
        .map(|(name, value)| json!({"name": name, "value": value}))
        .collect();
    let defaults: Map<String, Value> = rendered.defaults.into_iter().collect();
    let warnings: Vec<String> = rendered.warnings.iter().map(ToString::to_string).collect();
    let out = json!({
        "fields": fields,
        "defaults": defaults,
        "warnings": warnings,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_and_reports_unknown_tags() {
        let input = r#"{
            "template": [
                {"tag": "String", "name": "title"},
                {"tag": "Sparkles", "name": "fx"},
                {"tag": "Number", "name": "qty", "default": 2}
            ],
            "record": {"title": "Hi"}
        }"#;
        let out: Value =
            serde_json::from_str(&bind_document(input, &FieldRegistry::with_builtins()).unwrap())
                .unwrap();
        assert_eq!(
            out["fields"],
            json!([
                {"name": "title", "value": "Hi"},
                {"name": "qty", "value": 2}
            ])
        );
        assert_eq!(out["defaults"], json!({"title": "", "qty": 2}));
        assert_eq!(out["warnings"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn malformed_input() {
        assert!(bind_document("[", &FieldRegistry::with_builtins()).is_err());
    }
}
