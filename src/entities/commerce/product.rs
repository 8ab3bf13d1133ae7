use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog product with its color variants and offered sizes
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub discounted_price: Option<Decimal>,
    pub category_id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub variants: VariantList,
    #[sea_orm(column_type = "Json")]
    pub sizes: SizeList,
    #[sea_orm(nullable)]
    pub tag: Option<ProductTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Price the customer pays: the discounted price when one is set.
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.0.iter().any(|s| s == size)
    }

    /// Variant colors compare case-insensitively, with Unicode case folding.
    pub fn offers_color(&self, color: &str) -> bool {
        let color = color.to_lowercase();
        self.variants
            .0
            .iter()
            .any(|v| v.color.to_lowercase() == color)
    }

    /// Every media asset id referenced by the product's variants.
    pub fn media_public_ids(&self) -> Vec<String> {
        self.variants.public_ids()
    }
}

/// Marketing tag a product can carry
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::EnumString,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(ascii_case_insensitive)]
pub enum ProductTag {
    #[sea_orm(string_value = "New")]
    New,
    #[sea_orm(string_value = "Trending")]
    Trending,
    #[sea_orm(string_value = "Sale")]
    Sale,
}

/// Image or video stored on the media host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    pub public_id: String,
}

/// Color-specific grouping of media assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub color: String,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct VariantList(pub Vec<Variant>);

impl VariantList {
    pub fn public_ids(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|v| v.media.iter())
            .map(|m| m.public_id.clone())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SizeList(pub Vec<String>);
