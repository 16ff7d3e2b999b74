//! Schema-driven parameter state
//!
//! Out-of-range numbers are clamped and unknown names or enum values are
//! logged and ignored; nothing here fails a generation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::schema::{ParamType, ParameterDefinition, ParameterSchema};
use super::{GenerationParameters, ParamValue};
use crate::error::{GenError, Result};
use crate::seed::SeededRng;

/// Offset band applied on top of a value when randomizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VarianceRange {
    pub min: f64,
    pub max: f64,
}

impl VarianceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Change notification delivered to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEvent {
    /// One value changed
    Value { key: String, value: ParamValue },
    /// Several values were applied together (preset, import)
    Batch(GenerationParameters),
    Variance { key: String, range: VarianceRange },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ParamEvent) + Send>;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    values: GenerationParameters,
    #[serde(default)]
    variance: BTreeMap<String, VarianceRange>,
}

/// Current values and variance bands for one schema
pub struct ParameterManager {
    schema: ParameterSchema,
    values: GenerationParameters,
    variance: BTreeMap<String, VarianceRange>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for ParameterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterManager")
            .field("values", &self.values)
            .field("variance", &self.variance)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ParameterManager {
    /// Start from the schema defaults and their variance bands
    pub fn new(schema: ParameterSchema) -> Self {
        let values = schema.defaults();
        let variance = schema
            .definitions()
            .map(|(key, def)| {
                let range = VarianceRange::new(
                    def.variance_min.unwrap_or(0.0),
                    def.variance_max.unwrap_or(0.0),
                );
                (key.clone(), range)
            })
            .collect();
        Self {
            schema,
            values,
            variance,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn definition(&self, key: &str) -> Option<&ParameterDefinition> {
        self.schema.definition(key)
    }

    pub fn value(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Every current value, ready to hand to a generator
    pub fn values(&self) -> &GenerationParameters {
        &self.values
    }

    /// Validate and store one value, then notify listeners
    pub fn set_value(&mut self, key: &str, value: impl Into<ParamValue>) {
        if let Some(value) = self.store(key, value.into()) {
            self.notify(&ParamEvent::Value {
                key: key.to_string(),
                value,
            });
        }
    }

    /// Apply several values with a single batch notification
    pub fn set_multiple(&mut self, values: &GenerationParameters) {
        for (key, value) in values.iter() {
            self.store(key, value.clone());
        }
        self.notify(&ParamEvent::Batch(values.clone()));
    }

    fn store(&mut self, key: &str, value: ParamValue) -> Option<ParamValue> {
        let Some(def) = self.schema.definition(key) else {
            warn!("Unknown parameter: {}", key);
            return None;
        };
        let validated = match def.param_type {
            ParamType::Float | ParamType::Int => {
                let number = match &value {
                    ParamValue::Text(text) => text.trim().parse::<f64>().ok(),
                    other => other.as_f64(),
                };
                let Some(number) = number.filter(|n| !n.is_nan()) else {
                    warn!("Non-numeric value for {}: {}", key, value);
                    return None;
                };
                def.numeric_value(number)
            }
            ParamType::Enum => {
                let listed = value
                    .as_str()
                    .is_some_and(|v| def.values.iter().any(|allowed| allowed == v));
                if !listed {
                    warn!("Invalid enum value for {}: {}", key, value);
                    return None;
                }
                value
            }
            ParamType::Bool => match &value {
                ParamValue::Text(text) if text == "false" => ParamValue::Bool(false),
                other => ParamValue::Bool(other.truthy()),
            },
        };
        self.values.set(key, validated.clone());
        Some(validated)
    }

    /// Current value perturbed by its variance band and re-clamped.
    ///
    /// Enum and bool parameters come back unchanged and draw nothing from
    /// `rng`.
    pub fn randomized_value(&self, key: &str, rng: &mut SeededRng) -> Option<ParamValue> {
        let base = self.values.get(key)?;
        let (Some(def), Some(range)) = (self.schema.definition(key), self.variance.get(key)) else {
            return Some(base.clone());
        };
        if !def.param_type.is_numeric() {
            return Some(base.clone());
        }
        let Some(number) = base.as_f64() else {
            return Some(base.clone());
        };
        let offset = rng.next_float(range.min, range.max);
        Some(def.numeric_value(number + offset))
    }

    /// Randomize every value in name order
    pub fn all_randomized(&self, rng: &mut SeededRng) -> GenerationParameters {
        self.values
            .keys()
            .filter_map(|key| Some((key.clone(), self.randomized_value(key, rng)?)))
            .collect()
    }

    pub fn variance_range(&self, key: &str) -> Option<VarianceRange> {
        self.variance.get(key).copied()
    }

    pub fn set_variance_range(&mut self, key: &str, min: f64, max: f64) {
        let range = VarianceRange::new(min, max);
        self.variance.insert(key.to_string(), range);
        self.notify(&ParamEvent::Variance {
            key: key.to_string(),
            range,
        });
    }

    /// Apply a tier preset. Returns false (and logs) when it does not exist.
    pub fn load_preset(&mut self, name: &str) -> bool {
        let Some(preset) = self.schema.tier_presets.get(name) else {
            error!("Preset not found: {}", name);
            return false;
        };
        let mut flat = GenerationParameters::new();
        for values in preset.values() {
            flat.merge(values);
        }
        debug!("Loading preset '{}' ({} values)", name, flat.len());
        self.set_multiple(&flat);
        true
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.schema.tier_presets.keys().map(String::as_str)
    }

    /// Serialize current values and variance bands
    pub fn export_json(&self) -> Result<String> {
        let snapshot = Snapshot {
            values: self.values.clone(),
            variance: self.variance.clone(),
        };
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| GenError::InvalidParameter(format!("export failed: {}", e)))
    }

    /// Restore a document written by [`export_json`](Self::export_json).
    ///
    /// Values go through the same validation as [`set_multiple`](Self::set_multiple);
    /// variance bands replace the current ones wholesale.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let snapshot: Snapshot = serde_json::from_str(json).map_err(|e| {
            error!("Failed to import parameters: {}", e);
            GenError::InvalidParameter(format!("malformed parameter document: {}", e))
        })?;
        if !snapshot.values.is_empty() {
            self.set_multiple(&snapshot.values);
        }
        if !snapshot.variance.is_empty() {
            self.variance = snapshot.variance;
        }
        Ok(())
    }

    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&ParamEvent) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: &ParamEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::params::builtin_schema;
    use crate::sprite::SpriteKind;

    fn laser() -> ParameterManager {
        ParameterManager::new(builtin_schema(SpriteKind::Laser).unwrap())
    }

    #[test]
    fn test_numeric_clamping() {
        let mut params = laser();
        params.set_value("beam_width", 9999);
        assert_eq!(params.value("beam_width"), Some(&ParamValue::Int(10)));

        params.set_value("beam_width", 3.6);
        assert_eq!(params.value("beam_width"), Some(&ParamValue::Int(4)));

        params.set_value("distortion", -5.0);
        assert_eq!(params.value("distortion"), Some(&ParamValue::Float(0.0)));
    }

    #[test]
    fn test_numeric_text_is_parsed() {
        let mut params = laser();
        params.set_value("beam_width", "7");
        assert_eq!(params.value("beam_width"), Some(&ParamValue::Int(7)));
        params.set_value("beam_width", "wide");
        assert_eq!(params.value("beam_width"), Some(&ParamValue::Int(7)));
    }

    #[test]
    fn test_invalid_enum_ignored() {
        let mut params = laser();
        params.set_value("laser_type", "disco");
        assert_eq!(params.value("laser_type"), Some(&ParamValue::from("mining")));
        params.set_value("laser_type", "plasma");
        assert_eq!(params.value("laser_type"), Some(&ParamValue::from("plasma")));
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut params = laser();
        let before = params.values().clone();
        params.set_value("warp_factor", 9);
        assert_eq!(params.values(), &before);
    }

    #[test]
    fn test_bool_coercion() {
        let mut params = laser();
        params.set_value("add_electricity", 1);
        assert_eq!(params.value("add_electricity"), Some(&ParamValue::Bool(true)));
        params.set_value("add_electricity", "false");
        assert_eq!(params.value("add_electricity"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_randomized_stays_in_band() {
        let params = laser();
        let mut rng = SeededRng::new(42);
        for _ in 0..100 {
            let v = params.randomized_value("beam_width", &mut rng).unwrap();
            let ParamValue::Int(width) = v else {
                panic!("beam_width should stay an int");
            };
            assert!((3..=5).contains(&width));
        }
        // Enums never move and never consume the stream
        let state = rng.state();
        assert_eq!(
            params.randomized_value("laser_type", &mut rng),
            Some(ParamValue::from("mining"))
        );
        assert_eq!(rng.state(), state);
    }

    #[test]
    fn test_all_randomized_reproducible() {
        let params = laser();
        let a = params.all_randomized(&mut SeededRng::new(5));
        let b = params.all_randomized(&mut SeededRng::new(5));
        assert_eq!(a, b);
        assert_eq!(a.len(), params.values().len());
    }

    #[test]
    fn test_load_preset() {
        let mut params = laser();
        assert!(params.load_preset("heavy"));
        assert_eq!(params.value("laser_type"), Some(&ParamValue::from("plasma")));
        assert_eq!(params.value("add_electricity"), Some(&ParamValue::Bool(true)));
        assert!(!params.load_preset("ultra"));
        assert!(params.preset_names().any(|n| n == "light"));
    }

    #[test]
    fn test_listeners() {
        let mut params = laser();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = params.add_listener(move |event| sink.lock().unwrap().push(event.clone()));

        params.set_value("beam_width", 2);
        params.set_variance_range("beam_width", -2.0, 2.0);
        assert!(params.load_preset("standard"));
        assert!(params.remove_listener(id));
        params.set_value("beam_width", 3);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[0],
            ParamEvent::Value {
                key: "beam_width".into(),
                value: ParamValue::Int(2)
            }
        );
        assert!(matches!(seen[1], ParamEvent::Variance { .. }));
        assert!(matches!(seen[2], ParamEvent::Batch(_)));
        assert!(!params.remove_listener(id));
    }

    #[test]
    fn test_export_import() {
        let mut params = laser();
        params.set_value("beam_width", 8);
        params.set_variance_range("distortion", 0.0, 0.5);
        let json = params.export_json().unwrap();

        let mut restored = laser();
        restored.import_json(&json).unwrap();
        assert_eq!(restored.values(), params.values());
        assert_eq!(
            restored.variance_range("distortion"),
            Some(VarianceRange::new(0.0, 0.5))
        );
        assert!(matches!(
            restored.import_json("not json"),
            Err(GenError::InvalidParameter(_))
        ));
    }
}
