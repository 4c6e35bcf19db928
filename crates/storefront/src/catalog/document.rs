//! Firestore REST document encoding.
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Only the kinds the
//! product collection uses are interpreted; the rest are carried opaquely so
//! documents written by other clients still parse.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use sukoon_core::ProductId;

use super::CatalogError;
use crate::models::{NewProduct, Product};

/// Collection holding the catalog.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Field the catalog is ordered by.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A typed Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers travel as strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(serde_json::Value),
    MapValue(serde_json::Value),
}

/// A stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name; the last path segment is the document ID.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    fn string(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(Value::StringValue(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

/// One element of a `runQuery` response stream.
///
/// An empty result still yields one element carrying only `readTime`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryItem {
    pub document: Option<Document>,
}

/// Body of a `runQuery` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    pub order_by: Vec<Order>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl RunQueryRequest {
    /// All products ordered by creation time, newest first.
    #[must_use]
    pub fn newest_products() -> Self {
        Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: PRODUCTS_COLLECTION.to_string(),
                }],
                order_by: vec![Order {
                    field: FieldReference {
                        field_path: CREATED_AT_FIELD.to_string(),
                    },
                    direction: "DESCENDING",
                }],
            },
        }
    }
}

/// Encode a new product as a Firestore document body.
///
/// Whole-number prices are written as integers and everything else as
/// doubles, matching what the browser client writes.
#[must_use]
pub fn encode_product(product: &NewProduct, created_at: i64) -> Document {
    let price = if product.price.fract().is_zero()
        && let Some(whole) = product.price.to_i64()
    {
        Value::IntegerValue(whole.to_string())
    } else {
        Value::DoubleValue(product.price.to_f64().unwrap_or_default())
    };

    let mut fields = BTreeMap::new();
    fields.insert("name".into(), Value::StringValue(product.name.clone()));
    fields.insert(
        "description".into(),
        Value::StringValue(product.description.clone()),
    );
    fields.insert(
        "itemCode".into(),
        Value::StringValue(product.item_code.clone()),
    );
    fields.insert("price".into(), price);
    fields.insert(
        "imageUrl".into(),
        Value::StringValue(product.image_url.clone()),
    );
    fields.insert(
        "destinationUrl".into(),
        Value::StringValue(product.destination_url.clone()),
    );
    fields.insert(
        CREATED_AT_FIELD.into(),
        Value::IntegerValue(created_at.to_string()),
    );

    Document {
        name: String::new(),
        fields,
    }
}

/// Decode a stored document into a product.
///
/// # Errors
///
/// Returns `CatalogError::Malformed` if the document has no usable ID or a
/// numeric field cannot be read.
pub fn decode_product(document: &Document) -> Result<Product, CatalogError> {
    let id = document
        .id()
        .ok_or_else(|| CatalogError::Malformed(format!("no document id in '{}'", document.name)))?;

    let price = match document.fields.get("price") {
        Some(Value::IntegerValue(s)) => s
            .parse::<i64>()
            .map(Decimal::from)
            .map_err(|e| CatalogError::Malformed(format!("price '{s}': {e}")))?,
        Some(Value::DoubleValue(d)) => Decimal::from_f64(*d)
            .ok_or_else(|| CatalogError::Malformed(format!("price {d} out of range")))?,
        _ => Decimal::ZERO,
    };

    #[allow(clippy::cast_possible_truncation)] // epoch milliseconds fit in i64
    let created_at = match document.fields.get(CREATED_AT_FIELD) {
        Some(Value::IntegerValue(s)) => s.parse::<i64>().ok(),
        Some(Value::DoubleValue(d)) => Some(*d as i64),
        _ => None,
    };

    Ok(Product {
        id: ProductId::new(id),
        name: document.string("name"),
        description: document.string("description"),
        item_code: document.string("itemCode"),
        price,
        image_url: document.string("imageUrl"),
        destination_url: document.string("destinationUrl"),
        created_at,
    })
}
