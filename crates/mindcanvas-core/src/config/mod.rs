use crate::{Error, Result};
use serde_json::{Map, Value};

/// JSON configuration tree addressed with dotted paths (`viewport.minZoom`).
///
/// Unknown keys are kept and ignored. Typed getters return `Ok(None)` for a missing key and
/// [`Error::InvalidConfig`] when the key exists with the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig(Value);

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl CanvasConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(Error::InvalidConfig {
                key: String::new(),
                message: "config root must be a JSON object".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_f64(&self, dotted_path: &str) -> Result<Option<f64>> {
        match self.get(dotted_path) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => match v.as_f64() {
                Some(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(invalid(dotted_path, "expected a finite number", v)),
            },
        }
    }

    pub fn get_u64(&self, dotted_path: &str) -> Result<Option<u64>> {
        match self.get(dotted_path) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| invalid(dotted_path, "expected a non-negative integer", v)),
        }
    }

    pub fn get_bool(&self, dotted_path: &str) -> Result<Option<bool>> {
        match self.get(dotted_path) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| invalid(dotted_path, "expected a boolean", v)),
        }
    }

    pub fn get_str(&self, dotted_path: &str) -> Result<Option<&str>> {
        match self.get(dotted_path) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| invalid(dotted_path, "expected a string", v)),
        }
    }

    /// Writes `value` at `dotted_path`, replacing any non-object found along the way.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let segments: Vec<&str> = dotted_path.split('.').collect();
        insert_at(&mut self.0, &segments, value);
    }
}

fn invalid(key: &str, expected: &str, got: &Value) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        message: format!("{expected}, got {got}"),
    }
}

fn insert_at(slot: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *slot = value;
        return;
    };
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert_at(map.entry(*head).or_insert(Value::Null), rest, value);
    }
}
