// Envelope and schema table - the data flowing through a pipeline

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Self-describing record handed from the producer through every stage to the consumer.
///
/// `kind` and `schema_version` select the validation rules. `payload` and
/// `metadata` may be absent; writers create them on first use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMap<String, String>>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            schema_version: schema_version.into(),
            payload: None,
            metadata: None,
        }
    }

    /// Add a single payload field, creating the payload if absent
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_metadata(key, value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_ref()?.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.payload
            .as_ref()
            .is_some_and(|payload| payload.contains_key(name))
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }

    /// Set a metadata entry, creating the metadata map if absent
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
    }
}

/// Validation rule for one (kind, version) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Two-level schema table: kind -> version -> schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: HashMap<String, HashMap<String, Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(
        mut self,
        kind: impl Into<String>,
        version: impl Into<String>,
        schema: Schema,
    ) -> Self {
        self.schemas
            .entry(kind.into())
            .or_default()
            .insert(version.into(), schema);
        self
    }

    /// Exact-match lookup, no version fallback
    pub fn lookup(&self, kind: &str, version: &str) -> Option<&Schema> {
        self.schemas.get(kind)?.get(version)
    }

    /// Number of registered (kind, version) pairs
    pub fn len(&self) -> usize {
        self.schemas.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_lazy_containers() {
        let mut envelope = Envelope::new("user.created", "v1");
        assert!(envelope.payload.is_none());
        assert!(envelope.metadata.is_none());
        assert!(!envelope.has_field("id"));
        assert_eq!(envelope.metadata_value("source"), None);

        envelope.set_metadata("source", "demo");
        assert_eq!(envelope.metadata_value("source"), Some("demo"));

        let envelope = envelope.with_field("id", "u_1");
        assert_eq!(envelope.field("id"), Some(&json!("u_1")));
    }

    #[test]
    fn test_envelope_from_json() {
        let envelope: Envelope = serde_json::from_value(json!({
            "kind": "user.created",
            "schema_version": "v1",
            "payload": {"id": "u_1", "age": 30, "tags": ["a"]}
        }))
        .unwrap();

        assert_eq!(envelope.kind, "user.created");
        assert_eq!(envelope.field("age"), Some(&json!(30)));
        assert!(envelope.metadata.is_none());

        let text = serde_json::to_string(&envelope).unwrap();
        assert!(!text.contains("metadata"));
    }

    #[test]
    fn test_schema_registry_exact_lookup() {
        let registry = SchemaRegistry::new()
            .with_schema("user.created", "v1", Schema::new(["id", "email"]))
            .with_schema("user.created", "v2", Schema::new(["id"]));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup("user.created", "v1").map(|s| s.required_fields.len()),
            Some(2)
        );
        assert!(registry.lookup("user.created", "v3").is_none());
        assert!(registry.lookup("user.deleted", "v1").is_none());
    }

    #[test]
    fn test_schema_registry_from_json() {
        let registry: SchemaRegistry = serde_json::from_value(json!({
            "user.created": {"v1": {"required_fields": ["id", "email"]}}
        }))
        .unwrap();

        assert!(!registry.is_empty());
        assert_eq!(
            registry.lookup("user.created", "v1"),
            Some(&Schema::new(["id", "email"]))
        );
    }
}
