//! Tracing subscriber setup and credential redaction for diagnostics.

use std::fmt;
use tracing_subscriber::{fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const REDACTED: &str = "***";

/// Headers whose values never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "proxy-authorization", "x-api-key"];

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding apps) is not an error for us.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tfmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

/// Displays as `***` regardless of the wrapped secret.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Copies `headers`, masking the values of credential-bearing entries.
pub fn redact_headers<'a, I>(headers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .map(|(k, v)| {
            let value = if SENSITIVE_HEADERS.contains(&k.to_ascii_lowercase().as_str()) {
                REDACTED.to_string()
            } else {
                v.to_string()
            };
            (k.to_string(), value)
        })
        .collect()
}
