pub mod fetcher;
pub mod traits;

pub use fetcher::{source_for, FileCatalog, HttpCatalog};
pub use traits::CatalogSource;

use crate::model::{Catalog, CatalogError};
use tracing::info;

/// Loads and indexes the catalog from any source.
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog, CatalogError> {
    info!("Loading catalog from {}", source.describe());
    let catalog = Catalog::new(source.load().await?);
    info!("Catalog ready: {} products", catalog.len());
    Ok(catalog)
}
