use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::{Result, ShelfError};
use crate::models::{Catalog, Category, CategoryRecord, Product, ProductsEnvelope};
use crate::settings::Settings;

const CATEGORIES_PATH: &str = "/products/categories";
const PRODUCTS_PATH: &str = "/products";

/// Read-only client for the remote catalog API.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.api_base_url.clone(), &settings.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let records: Vec<CategoryRecord> = self.get_json(CATEGORIES_PATH).await?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    pub async fn fetch_products(&self) -> Result<Vec<Product>> {
        let envelope: ProductsEnvelope = self.get_json(PRODUCTS_PATH).await?;
        Ok(envelope.products.into_iter().map(Product::from).collect())
    }

    /// Fetch both lists concurrently. Either request failing discards both;
    /// every failure is reported as [`ShelfError::CatalogLoad`].
    pub async fn load_catalog(&self) -> Result<Catalog> {
        info!(base_url = %self.base_url, "loading catalog");
        match tokio::try_join!(self.fetch_categories(), self.fetch_products()) {
            Ok((categories, products)) => {
                info!(
                    categories = categories.len(),
                    products = products.len(),
                    "catalog loaded"
                );
                Ok(Catalog::new(categories, products))
            }
            Err(e) => {
                error!(error = %e, "error fetching catalog");
                Err(ShelfError::CatalogLoad(e.to_string()))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShelfError::Status { url, status });
        }

        let body = response.text().await?;
        decode(&body)
    }
}

/// Parse a response body. Kept separate from the transport so malformed
/// payloads can be checked without a server.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}
