//! Typed access to loosely typed request parameters.
//!
//! A `null` parameter is treated as absent.

use serde_json::{Map, Value};

use crate::dispatch::Request;
use crate::studio::{ItemRef, Studio};

use super::errors::CommandError;

/// Borrowing view over a request's parameters.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    request: &'a Request,
}

impl<'a> Params<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self { request }
    }

    fn value(&self, name: &str) -> Option<&'a Value> {
        self.request.param(name).filter(|value| !value.is_null())
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, CommandError> {
        match self.value(name) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| CommandError::invalid(name, format!("expected {expected}"))),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&'a str>, CommandError> {
        self.typed(name, "a string", Value::as_str)
    }

    pub fn str(&self, name: &str) -> Result<&'a str, CommandError> {
        self.opt_str(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, CommandError> {
        self.typed(name, "a boolean", Value::as_bool)
    }

    pub fn bool(&self, name: &str) -> Result<bool, CommandError> {
        self.opt_bool(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, CommandError> {
        self.typed(name, "a number", Value::as_f64)
    }

    pub fn f64(&self, name: &str) -> Result<f64, CommandError> {
        self.opt_f64(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>, CommandError> {
        self.typed(name, "an integer", Value::as_i64)
    }

    pub fn i64(&self, name: &str) -> Result<i64, CommandError> {
        self.opt_i64(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn opt_u64(&self, name: &str) -> Result<Option<u64>, CommandError> {
        self.typed(name, "a non-negative integer", Value::as_u64)
    }

    pub fn u64(&self, name: &str) -> Result<u64, CommandError> {
        self.opt_u64(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn opt_object(&self, name: &str) -> Result<Option<&'a Map<String, Value>>, CommandError> {
        self.typed(name, "an object", Value::as_object)
    }

    pub fn object(&self, name: &str) -> Result<&'a Map<String, Value>, CommandError> {
        self.opt_object(name)?.ok_or_else(|| CommandError::missing(name))
    }

    pub fn array(&self, name: &str) -> Result<&'a [Value], CommandError> {
        self.typed(name, "an array", |value| value.as_array().map(Vec::as_slice))?
            .ok_or_else(|| CommandError::missing(name))
    }

    /// A scene item given either as a source name or as `{"name", "id"}`.
    pub fn item(&self, name: &str) -> Result<ItemRef, CommandError> {
        let value = self.value(name).ok_or_else(|| CommandError::missing(name))?;
        item_ref(name, value)
    }

    /// Resolves an optional scene parameter, falling back to the program scene.
    pub fn scene_or_current(&self, name: &str, studio: &Studio) -> Result<String, CommandError> {
        Ok(studio.scene_name_or_current(self.opt_str(name)?))
    }

    /// Every parameter except those named in `skip`.
    pub fn rest(&self, skip: &[&str]) -> Map<String, Value> {
        self.request
            .params()
            .iter()
            .filter(|(key, _)| !skip.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Interprets `value` as a scene item reference. An `id` wins over a `name`.
pub fn item_ref(name: &str, value: &Value) -> Result<ItemRef, CommandError> {
    match value {
        Value::String(source) => Ok(ItemRef::Name(source.clone())),
        Value::Number(id) => id
            .as_i64()
            .map(ItemRef::Id)
            .ok_or_else(|| CommandError::invalid(name, "expected an integer item id")),
        Value::Object(fields) => {
            if let Some(id) = fields.get("id").and_then(Value::as_i64) {
                Ok(ItemRef::Id(id))
            } else if let Some(source) = fields.get("name").and_then(Value::as_str) {
                Ok(ItemRef::Name(source.to_owned()))
            } else {
                Err(CommandError::invalid(name, "expected an item name or id"))
            }
        }
        _ => Err(CommandError::invalid(name, "expected an item name or id")),
    }
}
