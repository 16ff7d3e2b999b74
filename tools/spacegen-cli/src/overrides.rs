//! `key=value` parameter overrides from the command line

use anyhow::{Result, bail};
use spacegen::{GenerationParameters, ParamValue};

/// Parse one `key=value` pair.
///
/// Values are typed by shape: `true`/`false`, then integers, then floats;
/// anything else stays text and is left to the schema to validate.
pub fn parse_override(arg: &str) -> Result<(String, ParamValue)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("Expected key=value, got '{}'", arg);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty parameter name in '{}'", arg);
    }
    Ok((key.to_string(), parse_value(value.trim())))
}

pub fn parse_value(value: &str) -> ParamValue {
    match value {
        "true" => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        _ => {
            if let Ok(v) = value.parse::<i64>() {
                ParamValue::Int(v)
            } else if let Ok(v) = value.parse::<f64>() {
                ParamValue::Float(v)
            } else {
                ParamValue::Text(value.to_string())
            }
        }
    }
}

/// Collect overrides into a parameter map; later keys win
pub fn parse_overrides<S: AsRef<str>>(args: &[S]) -> Result<GenerationParameters> {
    let mut params = GenerationParameters::new();
    for arg in args {
        let (key, value) = parse_override(arg.as_ref())?;
        params.set(key, value);
    }
    Ok(params)
}
