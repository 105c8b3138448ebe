//! `{{name}}` / `{{step.path}}` placeholders used in chain definition files.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([\w\-]+(?:\.[\w\-]+)*)\s*\}\}").expect("valid regex"))
}

/// Names referenced by `template`, in order of appearance.
pub fn references(template: &str) -> Vec<&str> {
    placeholder()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Renders `template` using `lookup` for each placeholder.
///
/// A template made of a single placeholder yields the referenced value with
/// its JSON type intact; otherwise values are spliced into the text. Unknown
/// references are an error.
pub fn render<F>(template: &str, lookup: F) -> Result<Value, String>
where
    F: Fn(&str) -> Option<Value>,
{
    let resolve = |name: &str| lookup(name).ok_or_else(|| format!("Unknown reference '{{{{{}}}}}'", name));

    if let Some(caps) = placeholder().captures(template) {
        if caps.get(0).map(|m| m.as_str()) == Some(template.trim()) {
            return resolve(&caps[1]);
        }
    }

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder().captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match resolve(name.as_str())? {
            Value::String(s) => out.push_str(&s),
            Value::Null => {}
            other => out.push_str(&other.to_string()),
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(Value::String(out))
}
