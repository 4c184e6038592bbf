// Catalog JSON parsing
use crate::model::{CatalogError, Product};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static NON_DIGIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\D").expect("Invalid price regex pattern")
});

pub trait Parser {
    fn parse(&self, raw: &str) -> Result<Vec<Product>, CatalogError>;
}

/// Reads product listings as published by the shop: a top-level array (or an
/// object with a `products` array) whose entries keep their attributes either
/// flat or under `specs`.
pub struct CatalogParser;

impl CatalogParser {
    pub fn new() -> Self {
        Self
    }

    fn product_from(&self, index: usize, entry: &Map<String, Value>) -> Option<Product> {
        let Some(id) = entry.get("id").and_then(id_text) else {
            warn!("Skipping catalog entry #{}: missing id", index);
            return None;
        };

        let specs = entry.get("specs").and_then(Value::as_object);
        let attribute = |key: &str| {
            specs
                .and_then(|s| s.get(key))
                .or_else(|| entry.get(key))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());

        Some(Product {
            price: entry.get("price").and_then(price_value),
            image: entry
                .get("image")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            cpu: attribute("cpu"),
            gpu: attribute("gpu"),
            ram: attribute("ram"),
            storage: attribute("storage"),
            battery: attribute("battery"),
            weight: attribute("weight"),
            screen: attribute("screen"),
            name,
            id,
            placeholder: false,
        })
    }
}

impl Default for CatalogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for CatalogParser {
    fn parse(&self, raw: &str) -> Result<Vec<Product>, CatalogError> {
        let document: Value = serde_json::from_str(raw)?;
        let entries = match &document {
            Value::Array(items) => items.as_slice(),
            Value::Object(obj) => obj
                .get("products")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            _ => &[],
        };

        let products: Vec<Product> = entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry.as_object() {
                Some(obj) => self.product_from(i, obj),
                None => {
                    warn!("Skipping catalog entry #{}: not an object", i);
                    None
                }
            })
            .collect();

        debug!("Parsed {} of {} catalog entries", products.len(), entries.len());
        Ok(products)
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric prices are taken as-is; display text like "15.990.000đ" keeps its digits.
/// Anything without a positive amount ("Liên hệ", null, 0) is unavailable.
pub fn price_value(value: &Value) -> Option<u64> {
    let amount = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.round() as u64)),
        Value::String(s) => NON_DIGIT_RE.replace_all(s, "").parse().ok(),
        _ => None,
    };
    amount.filter(|&a| a > 0)
}
