use crate::model::{CatalogError, Product};

/// Where the product catalog comes from.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Product>, CatalogError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
