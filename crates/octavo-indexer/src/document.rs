//! Search document builder
//!
//! A document maps output keys to one-or-many values. Repeated `add`
//! calls append into arrays with duplicate suppression; entity values
//! automatically gain a `<key>_packed` companion (`id||label`) for
//! simplified filtering. The field names and nesting produced here are
//! the wire contract with the index and must stay stable.

use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new(uri: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("uri".to_string(), Value::String(uri.to_string()));
        Self { fields }
    }

    pub fn uri(&self) -> &str {
        self.fields
            .get("uri")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Values under a key, when the key holds an array.
    pub fn values(&self, key: &str) -> Option<&Vec<Value>> {
        self.fields.get(key).and_then(Value::as_array)
    }

    /// First value under a key.
    pub fn first(&self, key: &str) -> Option<&Value> {
        self.values(key).and_then(|vals| vals.first())
    }

    /// Set a scalar field, replacing any existing value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Append a value to the key's array, skipping exact duplicates.
    pub fn add(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.fields.get_mut(key) {
            Some(Value::Array(vals)) => {
                if !vals.contains(&value) {
                    vals.push(value);
                }
            }
            Some(existing) => {
                // Scalar field promoted to array on second add
                if *existing != value {
                    let prior = existing.take();
                    *existing = Value::Array(vec![prior, value]);
                }
            }
            None => {
                self.fields.insert(key.to_string(), Value::Array(vec![value]));
            }
        }
        self
    }

    /// Add an entity value. With a label this produces `{id, label}` plus
    /// the `<key>_packed` companion; without one it degrades to the bare
    /// id string and no packed field.
    pub fn add_entity(&mut self, key: &str, id: &str, label: Option<&str>) -> &mut Self {
        match label {
            Some(label) => {
                self.add(key, json!({ "id": id, "label": label }));
                self.add(format!("{key}_packed").as_str(), format!("{id}||{label}"))
            }
            None => self.add(key, id),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}
