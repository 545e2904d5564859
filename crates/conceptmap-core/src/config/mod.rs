//! Site configuration.
//!
//! A JSON object with dotted-path access. Built-in presentation defaults live here; user
//! overrides are deep-merged on top once at startup and the result is resolved into typed,
//! immutable values ([`crate::Theme`], [`crate::GeneratorOptions`]).

use crate::{Error, Result};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig(Value);

impl Default for SiteConfig {
    fn default() -> Self {
        Self(default_site_value())
    }
}

fn default_site_value() -> Value {
    json!({
        "fontFamily": "\"trebuchet ms\", verdana, arial, sans-serif",
        "fontSize": 16,
        "mindmap": {
            "maxNodeWidth": 200,
            "padding": 10,
            "levelGap": 80,
            "siblingGap": 24
        },
        "themeVariables": {
            "root": { "fill": "hsl(240, 100%, 46.2745098039%)", "text": "#ffffff" },
            "secondary": { "fill": "hsl(60, 100%, 73.5294117647%)", "text": "black" },
            "tertiary": { "fill": "hsl(80, 100%, 76.2745098039%)", "text": "black" }
        },
        "generator": {
            "rootLimit": 25,
            "secondaryLimit": 22,
            "tertiaryLimit": 20,
            "placeholder": "No concepts yet",
            "denseBranchThreshold": 3
        }
    })
}

impl SiteConfig {
    /// Built-in defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut config = Self::default();
        config.deep_merge(overrides);
        config
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        if !overrides.is_object() {
            return Err(Error::InvalidConfig {
                path: String::new(),
                message: "config must be a JSON object".to_string(),
            });
        }
        Ok(Self::with_overrides(&overrides))
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    /// Typed read: missing keys fall back to `default`, present keys of the wrong type are an
    /// error.
    pub fn read_f64(&self, dotted_path: &str, default: f64) -> Result<f64> {
        match self.get(dotted_path) {
            None => Ok(default),
            Some(v) => v
                .as_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| invalid(dotted_path, "expected a finite number", v)),
        }
    }

    pub fn read_usize(&self, dotted_path: &str, default: usize) -> Result<usize> {
        match self.get(dotted_path) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid(dotted_path, "expected a non-negative integer", v)),
        }
    }

    pub fn read_string(&self, dotted_path: &str, default: &str) -> Result<String> {
        match self.get(dotted_path) {
            None => Ok(default.to_string()),
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(dotted_path, "expected a string", v)),
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn invalid(path: &str, expected: &str, got: &Value) -> Error {
    Error::InvalidConfig {
        path: path.to_string(),
        message: format!("{expected}, got {got}"),
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
