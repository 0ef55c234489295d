//! Catalog service: product insert, list and search

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{NewProduct, Product};
use crate::error::{AppError, ValidationError};
use crate::store::{with_timeout, ProductStore};
use crate::validators::is_valid_search_pattern;

pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    store_timeout: Duration,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>, store_timeout: Duration) -> Self {
        Self {
            products,
            store_timeout,
        }
    }

    pub async fn add_product(&self, new_product: NewProduct) -> Result<Product, AppError> {
        if new_product.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name".to_string()).into());
        }
        if new_product.rating > 5 {
            return Err(ValidationError::InvalidFormat("rating".to_string()).into());
        }

        let product = new_product.into_product();
        with_timeout(self.store_timeout, self.products.insert_product(&product)).await?;

        tracing::info!(product_id = %product.product_id, "Product added");
        Ok(product)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(with_timeout(self.store_timeout, self.products.list_products()).await?)
    }

    /// Products whose name matches `query` as a regular expression
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, AppError> {
        let pattern = is_valid_search_pattern(query)?;
        Ok(with_timeout(self.store_timeout, self.products.search_products(&pattern)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_product(name: &str, rating: u8) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: 900,
            rating,
            image: "img.jpg".to_string(),
        }
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::default()), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_add_list_search() {
        let catalog = service();
        catalog.add_product(new_product("Alienware x15", 5)).await.unwrap();
        catalog.add_product(new_product("Giorgio Armani", 4)).await.unwrap();

        assert_eq!(catalog.list_products().await.unwrap().len(), 2);

        let found = catalog.search("ware").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alienware x15");
    }

    #[tokio::test]
    async fn test_empty_search_rejected() {
        let result = service().search("  ").await;
        assert!(matches!(result, Err(AppError::Validation(ValidationError::EmptyField(_)))));
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let catalog = service();
        assert!(catalog.add_product(new_product("", 3)).await.is_err());
        assert!(catalog.add_product(new_product("Bicycle", 9)).await.is_err());
    }
}
