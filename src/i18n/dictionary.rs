//! Dictionary: the translated strings of one language, addressed by
//! dot-separated key paths (`form.buttons.submitting`).

use crate::i18n::{LanguageCode, LoadError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key path separator.
pub const KEY_SEPARATOR: char = '.';

/// An immutable, tree-shaped translation dictionary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    root: Map<String, Value>,
}

impl Dictionary {
    /// Build a dictionary from parsed JSON. The top level must be an object.
    pub fn from_value(language: LanguageCode, value: Value) -> Result<Self, LoadError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(LoadError::NotAnObject { language }),
        }
    }

    /// Parse a dictionary from JSON text.
    pub fn from_json_str(language: LanguageCode, json: &str) -> Result<Self, LoadError> {
        let value: Value =
            serde_json::from_str(json).map_err(|source| LoadError::Parse { language, source })?;
        Self::from_value(language, value)
    }

    /// Walk `key` segment by segment. Returns the value only if every segment
    /// resolves to an entry of a nested mapping.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut value = self.root.get(first)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        Some(value)
    }

    /// Resolve `key` to display text.
    ///
    /// Strings are returned as-is, numbers and booleans are rendered.
    /// Mappings, arrays and nulls are not text and resolve to `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(_) | Value::Array(_) | Value::Null => None,
        }
    }

    /// Every leaf (non-mapping value) keyed by its full dotted path.
    pub fn leaves(&self) -> BTreeMap<String, &Value> {
        let mut result = BTreeMap::new();
        for (key, value) in &self.root {
            collect_leaves(key.clone(), value, &mut result);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn collect_leaves<'a>(prefix: String, value: &'a Value, out: &mut BTreeMap<String, &'a Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(format!("{prefix}{KEY_SEPARATOR}{key}"), child, out);
            }
        }
        leaf => {
            out.insert(prefix, leaf);
        }
    }
}
