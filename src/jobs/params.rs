use serde_json::Value;

use crate::error::{Error, Result};

/// Insertion-ordered key/value parameter set backing `.job` and
/// `.properties` files.
///
/// Values are free-form JSON, but only strings, integers, lists of scalars
/// and mappings survive rendering; anything else is a definition error. The
/// `dependencies` key is reserved: the rendered line is always derived from
/// the owning flow's graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace a value. A replaced key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as `key=value` text, one pair per line, in insertion order.
    pub fn render(&self) -> Result<String> {
        let mut lines = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            lines.push(format!("{}={}", key, render_value(key, value)?));
        }
        Ok(lines.join("\n"))
    }
}

/// Render a single parameter value: strings and integers verbatim, lists
/// comma-joined (scalar elements only), mappings as their comma-joined key
/// set.
pub(crate) fn render_value(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => parts.push(s.clone()),
                    Value::Number(n) if n.is_i64() || n.is_u64() => parts.push(n.to_string()),
                    _ => return Err(Error::UnsupportedValue { key: key.to_string() }),
                }
            }
            Ok(parts.join(","))
        }
        Value::Object(map) => Ok(map.keys().cloned().collect::<Vec<_>>().join(",")),
        _ => Err(Error::UnsupportedValue { key: key.to_string() }),
    }
}

/// A named flat parameter set attached to a flow or project, serialized once
/// per archive build as `<name>.properties`. Content is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    name: String,
    params: Params,
}

impl Properties {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self { name: name.into(), params }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> String {
        format!("{}.properties", self.name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn text(&self) -> Result<String> {
        self.params.render()
    }
}
