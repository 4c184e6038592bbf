use crate::loader::traits::CatalogSource;
use crate::model::{CatalogError, Product};
use crate::parser::{CatalogParser, Parser};
use reqwest::Client;
use std::path::PathBuf;
use tracing::warn;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) LaptopAdvisor/0.1";

pub struct HttpCatalog {
    client: Client,
    url: String,
    parser: CatalogParser,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Result<Self, CatalogError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            parser: CatalogParser::new(),
        })
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalog {
    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            warn!("Catalog request to {} failed: {}", self.url, response.status());
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        self.parser.parse(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileCatalog {
    path: PathBuf,
    parser: CatalogParser,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parser: CatalogParser::new(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for FileCatalog {
    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        self.parser.parse(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `http(s)://` locations are fetched, anything else is read from disk.
pub fn source_for(location: &str) -> Result<Box<dyn CatalogSource>, CatalogError> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpCatalog::new(location)?))
    } else {
        Ok(Box::new(FileCatalog::new(location)))
    }
}
