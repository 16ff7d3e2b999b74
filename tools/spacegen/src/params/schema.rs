//! Parameter schemas
//!
//! A schema groups parameter definitions into named categories and carries
//! optional tier presets (partial value sets keyed by category). Schemas are
//! plain JSON; one ships with the crate for every sprite kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{GenerationParameters, ParamValue};
use crate::error::{GenError, Result};
use crate::sprite::SpriteKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Float,
    Int,
    Enum,
    Bool,
}

impl ParamType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ParamType::Float | ParamType::Int)
    }
}

/// Range, default and variance of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub default: ParamValue,
    /// Lower bound of the offset applied by randomization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_max: Option<f64>,
    /// Legal values of an enum parameter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterDefinition {
    /// Clamp a number into `[min, max]`, rounding for int parameters
    pub fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        if self.param_type == ParamType::Int {
            v = v.round();
        }
        v
    }

    /// Wrap a clamped number in the value variant matching the type
    pub(crate) fn numeric_value(&self, value: f64) -> ParamValue {
        let v = self.clamp(value);
        match self.param_type {
            ParamType::Int => ParamValue::Int(v as i64),
            _ => ParamValue::Float(v),
        }
    }

    /// Default value normalized to the declared type
    pub fn default_value(&self) -> ParamValue {
        match (self.param_type, self.default.as_f64()) {
            (ParamType::Float | ParamType::Int, Some(v)) => self.numeric_value(v),
            _ => self.default.clone(),
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        let invalid = |msg: String| -> Result<()> {
            Err(GenError::InvalidParameter(format!("{}: {}", key, msg)))
        };
        match self.param_type {
            ParamType::Float | ParamType::Int => {
                let Some(default) = self.default.as_f64() else {
                    return invalid(format!("default '{}' is not a number", self.default));
                };
                if let (Some(min), Some(max)) = (self.min, self.max)
                    && min > max
                {
                    return invalid(format!("min {} exceeds max {}", min, max));
                }
                let below = self.min.is_some_and(|min| default < min);
                let above = self.max.is_some_and(|max| default > max);
                if below || above {
                    return invalid(format!("default {} outside range", default));
                }
            }
            ParamType::Enum => {
                if self.values.is_empty() {
                    return invalid("enum has no values".into());
                }
                let Some(default) = self.default.as_str() else {
                    return invalid(format!("default '{}' is not a string", self.default));
                };
                if !self.values.iter().any(|v| v == default) {
                    return invalid(format!(
                        "default '{}' is not one of {:?}",
                        default, self.values
                    ));
                }
            }
            ParamType::Bool => {
                if self.default.as_bool().is_none() {
                    return invalid(format!("default '{}' is not a boolean", self.default));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: BTreeMap<String, ParameterDefinition>,
}

/// Categorized parameter definitions plus tier presets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub categories: BTreeMap<String, Category>,
    /// Preset name -> category -> partial values
    #[serde(default)]
    pub tier_presets: BTreeMap<String, BTreeMap<String, GenerationParameters>>,
}

impl ParameterSchema {
    /// Parse and validate a JSON schema
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: ParameterSchema = serde_json::from_str(json)
            .map_err(|e| GenError::InvalidParameter(format!("malformed schema: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Look a parameter up by name across all categories
    pub fn definition(&self, key: &str) -> Option<&ParameterDefinition> {
        self.categories
            .values()
            .find_map(|category| category.parameters.get(key))
    }

    /// Every `(name, definition)` pair, category by category
    pub fn definitions(&self) -> impl Iterator<Item = (&String, &ParameterDefinition)> {
        self.categories
            .values()
            .flat_map(|category| category.parameters.iter())
    }

    /// Default value of every parameter
    pub fn defaults(&self) -> GenerationParameters {
        self.definitions()
            .map(|(key, def)| (key.clone(), def.default_value()))
            .collect()
    }

    /// Check every definition and that no name appears in two categories
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeMap::new();
        for (category, group) in &self.categories {
            for (key, def) in &group.parameters {
                if let Some(other) = seen.insert(key.as_str(), category.as_str()) {
                    return Err(GenError::InvalidParameter(format!(
                        "{} defined in both '{}' and '{}'",
                        key, other, category
                    )));
                }
                def.validate(key)?;
            }
        }
        Ok(())
    }
}

/// The schema bundled for a sprite kind
pub fn builtin_schema(kind: SpriteKind) -> Result<ParameterSchema> {
    let json = match kind {
        SpriteKind::Ship => include_str!("../../schemas/ship.json"),
        SpriteKind::Asteroid => include_str!("../../schemas/asteroid.json"),
        SpriteKind::Projectile => include_str!("../../schemas/projectile.json"),
        SpriteKind::Effect => include_str!("../../schemas/effect.json"),
        SpriteKind::Background => include_str!("../../schemas/background.json"),
        SpriteKind::Laser => include_str!("../../schemas/laser.json"),
        SpriteKind::Scanner => include_str!("../../schemas/scanner.json"),
    };
    ParameterSchema::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    #[test]
    fn test_builtin_schemas_parse() {
        for kind in SpriteKind::ALL {
            let schema = builtin_schema(kind).unwrap();
            assert!(schema.definition("size").is_some(), "{}", kind);
            assert!(!schema.tier_presets.is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_defaults_drive_every_generator() {
        for kind in SpriteKind::ALL {
            let mut defaults = builtin_schema(kind).unwrap().defaults();
            // Keep the big canvases quick
            defaults.set("size", 32);
            let frames = crate::sprite::generate(kind, &defaults, &Palette::default(), 7).unwrap();
            assert!(!frames.is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_float_default_normalized() {
        let schema = builtin_schema(SpriteKind::Asteroid).unwrap();
        let rotation = schema.definition("rotation").unwrap();
        assert_eq!(rotation.default_value(), ParamValue::Float(0.0));
    }

    #[test]
    fn test_enum_default_must_be_listed() {
        let json = r#"{"categories": {"a": {"parameters": {
            "kind": {"type": "enum", "values": ["x", "y"], "default": "z"}
        }}}}"#;
        assert!(matches!(
            ParameterSchema::from_json(json),
            Err(GenError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let json = r#"{"categories": {
            "a": {"parameters": {"n": {"type": "bool", "default": true}}},
            "b": {"parameters": {"n": {"type": "bool", "default": false}}}
        }}"#;
        assert!(ParameterSchema::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ParameterSchema::from_json("{"),
            Err(GenError::InvalidParameter(_))
        ));
    }
}
