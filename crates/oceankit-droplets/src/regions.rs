//! Regions, sizes and the static region catalog

use oceankit_core::error::Result;
use oceankit_core::page;
use oceankit_core::transport::ApiClient;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub slug: String,
    pub name: String,
    pub available: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl Region {
    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/regions", "regions").await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Size {
    pub slug: String,
    pub memory: u64,
    pub vcpus: u64,
    pub disk: u64,
    pub available: bool,
    #[serde(default)]
    pub price_monthly: f64,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Size {
    pub async fn list(client: &ApiClient) -> Result<Vec<Self>> {
        page::collect_all(client, "/v2/sizes", "sizes").await
    }
}

/// Static slug-to-name catalog of well-known regions
///
/// Built once on first use and read-only afterwards; the live listing via
/// [`Region::list`] remains the authority for availability.
pub fn region_catalog() -> &'static BTreeMap<&'static str, &'static str> {
    static CATALOG: OnceLock<BTreeMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        BTreeMap::from([
            ("ams3", "Amsterdam 3"),
            ("blr1", "Bangalore 1"),
            ("fra1", "Frankfurt 1"),
            ("lon1", "London 1"),
            ("nyc1", "New York 1"),
            ("nyc2", "New York 2"),
            ("nyc3", "New York 3"),
            ("sfo2", "San Francisco 2"),
            ("sfo3", "San Francisco 3"),
            ("sgp1", "Singapore 1"),
            ("syd1", "Sydney 1"),
            ("tor1", "Toronto 1"),
        ])
    })
}

/// Display name of a well-known region slug
pub fn region_display_name(slug: &str) -> Option<&'static str> {
    region_catalog().get(slug).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_stable_across_calls() {
        let first = region_catalog() as *const _;
        let second = region_catalog() as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn catalog_knows_common_slugs() {
        assert_eq!(region_display_name("nyc3"), Some("New York 3"));
        assert_eq!(region_display_name("atlantis1"), None);
    }
}
