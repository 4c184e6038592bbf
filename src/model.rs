// Core structs: Product, Catalog, Priorities, ComparisonRequest, ComparisonResult
use serde::de::{self, Deserializer};
use serde::ser::{self, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// Marker shown wherever an attribute is missing.
pub const UNAVAILABLE: &str = "N/A";

/// Key holding the row label in a serialized [`FeatureRow`]; no product may use it as its id.
pub const FEATURE_KEY: &str = "feature";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// `None` when the listing gives no usable price (e.g. "Liên hệ").
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub gpu: String,
    #[serde(default)]
    pub ram: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub battery: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub screen: String,
    /// Set only on stand-ins for ids the catalog does not know.
    #[serde(skip)]
    pub placeholder: bool,
}

impl Product {
    /// Stand-in for an id that is missing from the catalog.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Không xác định ({})", id),
            price: None,
            image: None,
            cpu: String::new(),
            gpu: String::new(),
            ram: String::new(),
            storage: String::new(),
            battery: String::new(),
            weight: String::new(),
            screen: String::new(),
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Read-only, ordered product catalog. Lookups are by id; the first occurrence of an id wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(products.len());
        for product in products {
            if product.id == FEATURE_KEY {
                warn!("Skipping product with reserved id: {}", product.id);
                continue;
            }
            if seen.insert(product.id.clone()) {
                unique.push(product);
            } else {
                warn!("Duplicate product id in catalog, keeping first: {}", product.id);
            }
        }
        Self { products: unique }
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Resolves an id, substituting a placeholder when it is unknown.
    pub fn resolve(&self, id: &str) -> Product {
        match self.find(id) {
            Some(product) => product.clone(),
            None => {
                warn!("Unknown product id: {}", id);
                Product::placeholder(id)
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Slider midpoint, also used for anything that cannot be read as a number.
pub const PRIORITY_MIDPOINT: f64 = 50.0;

/// The three priority sliders, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priorities {
    #[serde(default = "midpoint", deserialize_with = "lenient_priority")]
    pub performance: f64,
    #[serde(default = "midpoint", deserialize_with = "lenient_priority")]
    pub mobility: f64,
    #[serde(default = "midpoint", deserialize_with = "lenient_priority")]
    pub price: f64,
}

impl Priorities {
    pub fn new(performance: f64, mobility: f64, price: f64) -> Self {
        Self {
            performance: sanitize_priority(performance),
            mobility: sanitize_priority(mobility),
            price: sanitize_priority(price),
        }
    }

    /// Status label shown next to a slider.
    pub fn level_label(value: f64) -> &'static str {
        if value <= 20.0 {
            "Rất thấp"
        } else if value <= 40.0 {
            "Thấp"
        } else if value <= 60.0 {
            "Trung bình"
        } else if value <= 80.0 {
            "Cao"
        } else {
            "Rất cao"
        }
    }
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            performance: PRIORITY_MIDPOINT,
            mobility: PRIORITY_MIDPOINT,
            price: PRIORITY_MIDPOINT,
        }
    }
}

fn midpoint() -> f64 {
    PRIORITY_MIDPOINT
}

/// Clamps a slider value into [0, 100]; non-finite values fall back to the midpoint.
pub fn sanitize_priority(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        PRIORITY_MIDPOINT
    }
}

/// Parses a slider value from text, falling back to the midpoint.
pub fn parse_priority(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .map(sanitize_priority)
        .unwrap_or(PRIORITY_MIDPOINT)
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPriority {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    match RawPriority::deserialize(deserializer) {
        Ok(RawPriority::Number(n)) => Ok(sanitize_priority(n)),
        Ok(RawPriority::Text(s)) => Ok(parse_priority(&s)),
        Ok(RawPriority::Other(_)) => Ok(PRIORITY_MIDPOINT),
        Err(e) => Err(de::Error::custom(e)),
    }
}

/// One comparison request as issued by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub ids: Vec<String>,
    #[serde(default)]
    pub priorities: Priorities,
    #[serde(default)]
    pub prompt: String,
}

impl ComparisonRequest {
    pub fn new(ids: Vec<String>, priorities: Priorities, prompt: impl Into<String>) -> Self {
        Self {
            ids,
            priorities,
            prompt: prompt.into(),
        }
    }
}

/// A table row: feature label plus one display value per product id, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub feature: String,
    pub values: Vec<(String, String)>,
}

impl FeatureRow {
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, id: &str, value: String) {
        self.values.push((id.to_string(), value));
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.values.iter().any(|(id, _)| id == FEATURE_KEY) {
            return Err(ser::Error::custom(format!("product id '{}' clashes with the row label key", FEATURE_KEY)));
        }
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(FEATURE_KEY, &self.feature)?;
        for (id, value) in &self.values {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// What the comparator hands back to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub summary: String,
    pub laptop_names: Vec<String>,
    pub comparison_details: Vec<FeatureRow>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog request returned status {0}")]
    Status(u16),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Select at least {min} products to compare (got {selected})")]
    TooFewProducts { selected: usize, min: usize },
    #[error("At most {max} products can be compared at once (got {selected})")]
    TooManyProducts { selected: usize, max: usize },
    #[error("A comparison is already running")]
    Busy,
    #[error("Product id '{id}' is reserved")]
    ReservedId { id: String },
}
