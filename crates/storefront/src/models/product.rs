//! Product domain types.
//!
//! The serialized shape (camelCase keys, price as a JSON number) is shared by
//! the local fallback slot and the admin export, so records written by older
//! clients still load.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use sukoon_core::ProductId;

/// A catalog item.
///
/// Products are never edited in place; replacing one means delete and re-create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend-assigned ID. Not portable between remote and local storage.
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_code: String,
    /// Base price in USD.
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "price_or_zero"
    )]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    /// Checkout redirect target.
    #[serde(default)]
    pub destination_url: String,
    /// Creation time in epoch milliseconds. Missing on some legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Browser-written slots store a `NaN` price as `null`; read it as zero.
fn price_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    rust_decimal::serde::float_option::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A product as submitted by the admin, before any backend assigns an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub item_code: String,
    /// Base price in USD.
    pub price: Decimal,
    pub image_url: String,
    pub destination_url: String,
}

impl NewProduct {
    /// Attach an ID and creation stamp.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: i64) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            item_code: self.item_code,
            price: self.price,
            image_url: self.image_url,
            destination_url: self.destination_url,
            created_at: Some(created_at),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_record() {
        // Written by the browser client: integer price, no createdAt.
        let json = r#"{
            "id": "1",
            "name": "Sukoon Premium Item",
            "description": "A flagship product from Sukoon Base.",
            "itemCode": "SKN-001",
            "price": 15,
            "imageUrl": "https://picsum.photos/seed/skn/400/400",
            "destinationUrl": "https://sukoonbase.com"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.item_code, "SKN-001");
        assert_eq!(product.price, Decimal::from(15));
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn test_serialize_uses_camel_case_and_numeric_price() {
        let product = NewProduct {
            name: "Oud".into(),
            description: "Attar".into(),
            item_code: "SKN-002".into(),
            price: Decimal::new(1999, 2),
            image_url: "https://img.example/oud.jpg".into(),
            destination_url: "https://pay.example/oud".into(),
        }
        .into_product(ProductId::new("1718000000000"), 1_718_000_000_000);

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["itemCode"], "SKN-002");
        assert_eq!(value["destinationUrl"], "https://pay.example/oud");
        assert_eq!(value["createdAt"], 1_718_000_000_000_i64);
        assert!((value["price"].as_f64().unwrap() - 19.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_price_reads_as_zero() {
        let product: Product =
            serde_json::from_str(r#"{"id":"2","name":"Attar","price":null}"#).unwrap();
        assert_eq!(product.name, "Attar");
        assert_eq!(product.price, Decimal::ZERO);

        let product: Product = serde_json::from_str(r#"{"id":"3","price":12.5}"#).unwrap();
        assert_eq!(product.price, Decimal::new(125, 1));
    }

    #[test]
    fn test_missing_fields_default() {
        let product: Product = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
    }
}
