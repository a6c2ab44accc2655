//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server (origin URL and static weight)
//! - Parse the configured server list into an ordered registry
//! - Normalize URLs and recover from malformed weights

use std::fmt;

use thiserror::Error;
use url::Url;

/// Weight used when an entry carries none, or an unusable one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Error type for registry construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Nothing usable was left after parsing.
    #[error("No valid backend servers found in '{0}'")]
    NoBackends(String),
}

/// A single backend server. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendDescriptor {
    /// Absolute origin, e.g. `http://10.0.0.1:8080`, without trailing slash.
    url: String,
    /// Configured base weight, always finite and positive.
    static_weight: f64,
}

impl BackendDescriptor {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn static_weight(&self) -> f64 {
        self.static_weight
    }

    /// Absolute URL for `path_and_query` on this backend.
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.url, path_and_query)
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (weight {})", self.url, self.static_weight)
    }
}

/// Ordered, non-empty collection of backends. Insertion order is preserved.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// Parse a comma-separated list of `host[:port]` or `host[:port]|weight`
    /// entries.
    ///
    /// Blank entries are skipped. A missing scheme becomes `http://`. A weight
    /// that does not parse, or is not a finite positive number, falls back to
    /// [`DEFAULT_WEIGHT`] with a warning; the entry is kept. Entries whose
    /// URL is not a valid absolute URL are skipped with a warning.
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let backends: Vec<BackendDescriptor> = raw.split(',').filter_map(parse_entry).collect();

        if backends.is_empty() {
            tracing::error!(servers = %raw, "No valid backend servers found");
            return Err(RegistryError::NoBackends(raw.to_string()));
        }

        for backend in &backends {
            tracing::info!(url = %backend.url, weight = backend.static_weight, "Backend registered");
        }

        Ok(Self { backends })
    }

    pub fn backends(&self) -> &[BackendDescriptor] {
        &self.backends
    }

    pub fn get(&self, index: usize) -> Option<&BackendDescriptor> {
        self.backends.get(index)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false for a registry that came out of [`BackendRegistry::parse`].
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Static weights in registry order.
    pub fn static_weights(&self) -> Vec<f64> {
        self.backends.iter().map(|b| b.static_weight).collect()
    }
}

fn parse_entry(entry: &str) -> Option<BackendDescriptor> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    let (server, weight) = match entry.split_once('|') {
        Some((server, weight)) => (server.trim(), parse_weight(entry, weight.trim())),
        None => (entry, DEFAULT_WEIGHT),
    };

    if server.is_empty() {
        tracing::warn!(entry = %entry, "Skipping backend entry without a server");
        return None;
    }

    let url = if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    };

    if let Err(e) = Url::parse(&url) {
        tracing::warn!(entry = %entry, error = %e, "Skipping backend entry with invalid URL");
        return None;
    }

    Some(BackendDescriptor {
        url: url.trim_end_matches('/').to_string(),
        static_weight: weight,
    })
}

fn parse_weight(entry: &str, text: &str) -> f64 {
    match text.parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => weight,
        _ => {
            tracing::warn!(entry = %entry, weight = %text, "Invalid weight, using default {}", DEFAULT_WEIGHT);
            DEFAULT_WEIGHT
        }
    }
}
