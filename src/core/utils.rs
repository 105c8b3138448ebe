use serde_json::Value;

/// Split `key=value` arguments. Keys are trimmed; values are kept as given.
pub fn parse_pairs(pairs: &[String]) -> Result<Vec<(String, String)>, String> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid assignment '{}'. Use key=value.", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("Missing key in '{}'", pair));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Interpret a CLI value as a JSON scalar: numbers and booleans keep their
/// type, everything else is a string.
pub fn parse_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(b) = trimmed.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(raw.to_string())
}
