//! Generation parameters and schema-driven validation
//!
//! [`GenerationParameters`] is the flat name-to-value map every generator
//! config is built from. [`ParameterSchema`] describes the legal range of each
//! name, and [`ParameterManager`] applies it: clamping, enum validation,
//! variance randomization, and tier presets.

mod manager;
mod schema;

pub use manager::{ListenerId, ParamEvent, ParameterManager, VarianceRange};
pub use schema::{Category, ParamType, ParameterDefinition, ParameterSchema, builtin_schema};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Loose truthiness: zero, NaN and the empty string are false
    pub fn truthy(&self) -> bool {
        match self {
            ParamValue::Bool(v) => *v,
            ParamValue::Int(v) => *v != 0,
            ParamValue::Float(v) => *v != 0.0 && !v.is_nan(),
            ParamValue::Text(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v as f64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Flat mapping from parameter name to value
///
/// Keys are kept sorted so iteration order (and therefore any RNG stream
/// consumed while iterating) is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParameters {
    values: BTreeMap<String, ParamValue>,
}

impl GenerationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Copy every entry of `other` over this map
    pub fn merge(&mut self, other: &GenerationParameters) {
        for (key, value) in other.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Float value, or `default` when absent
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_f64().ok_or_else(|| type_error(key, "a number", value)),
        }
    }

    /// Non-negative integer value (floats are rounded), or `default`
    pub fn u32_or(&self, key: &str, default: u32) -> Result<u32> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| type_error(key, "an integer", value))?
                    .round();
                if n < 0.0 || n > u32::MAX as f64 {
                    return Err(GenError::InvalidParameter(format!(
                        "{} must be a non-negative integer, got {}",
                        key, value
                    )));
                }
                Ok(n as u32)
            }
        }
    }

    /// Boolean value, or `default` when absent
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| type_error(key, "a boolean", value)),
        }
    }

    /// String value, or `default` when absent
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_str().ok_or_else(|| type_error(key, "a string", value)),
        }
    }

    /// Parse a string-valued selector, or return `default` when absent
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr<Err = GenError>,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_str()
                .ok_or_else(|| type_error(key, "a string", value))?
                .parse(),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for GenerationParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

fn type_error(key: &str, expected: &str, value: &ParamValue) -> GenError {
    GenError::InvalidParameter(format!("{} must be {}, got '{}'", key, expected, value))
}
