//! Cache key formats.
//!
//! Keys are colon-joined and case-sensitive. Embedded colons are not
//! escaped, so `("a:b", "c")` and `("a", "b:c")` share a key.

use std::fmt;

use crate::layer::{DetailLevel, Layer};

/// Key of the in-process tier: `<country>:<city>:<radius>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryKey(String);

impl MemoryKey {
    pub fn new(country: &str, city: &str, radius_m: f64) -> Self {
        Self(format!("{}:{}:{}", country, city, radius_m))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of the persistent tier: `<country>:<city>:<radius>:<detail>:<layer>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistentKey(String);

impl PersistentKey {
    pub fn new(
        country: &str,
        city: &str,
        radius_m: f64,
        detail: DetailLevel,
        layer: Layer,
    ) -> Self {
        Self(format!(
            "{}:{}:{}:{}:{}",
            country, city, radius_m, detail, layer
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
