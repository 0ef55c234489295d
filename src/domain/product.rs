use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub price: u64,
    pub rating: u8,
    pub image: String,
}

/// Product input from the admin endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: u64,
    pub rating: u8,
    pub image: String,
}

impl NewProduct {
    pub fn into_product(self) -> Product {
        Product {
            product_id: Uuid::new_v4(),
            name: self.name,
            price: self.price,
            rating: self.rating,
            image: self.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: Uuid,
    pub house: String,
    pub street: String,
    pub city: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub digital: bool,
    pub cod: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub order_list: Vec<Product>,
    pub ordered_at: DateTime<Utc>,
    pub total_price: u64,
    pub discount: Option<u32>,
    pub payment_method: Payment,
}
