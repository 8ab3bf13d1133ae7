use crate::{
    entities::commerce::{
        product, Category, CategoryModel, Product, ProductModel, ProductTag, SizeList, Variant,
        VariantList,
    },
    errors::ServiceError,
    services::{
        commerce::product_filter::ProductFilter,
        media::{delete_assets, MediaHost},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::category_service::CategoryService;

/// Product with its category populated
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithCategory {
    pub product: ProductModel,
    pub category: Option<CategoryModel>,
}

/// Product catalog service
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
    categories: Arc<CategoryService>,
    media: Arc<dyn MediaHost>,
}

impl ProductCatalogService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        categories: Arc<CategoryService>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            db,
            categories,
            media,
        }
    }

    /// Lists products matching `filter`.
    ///
    /// A gender filter is resolved to category ids first; when no category
    /// matches, the result is empty without querying products.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, ServiceError> {
        let category_ids = if filter.needs_category_lookup() {
            let ids = self
                .categories
                .category_ids_for_genders(&filter.genders)
                .await?;
            if ids.is_empty() {
                debug!("No category for genders {:?}", filter.genders);
                return Ok(Vec::new());
            }
            Some(ids)
        } else {
            None
        };

        let rows = Product::find()
            .filter(filter.condition(category_ids.as_deref()))
            .find_also_related(Category)
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(product, _)| filter.matches(product))
            .map(|(product, category)| ProductWithCategory { product, category })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductWithCategory, ServiceError> {
        let (product, category) = Product::find_by_id(id)
            .find_also_related(Category)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        Ok(ProductWithCategory { product, category })
    }

    /// Product row without its category, for updates and deletes
    async fn find_product(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductWithCategory, ServiceError> {
        let variants = normalize_variants(input.variants)?;
        let sizes = normalize_sizes(input.sizes)?;
        check_prices(input.price, input.discounted_price)?;
        let category = self.categories.get_category(input.category_id).await?;

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            discounted_price: Set(input.discounted_price),
            category_id: Set(category.id),
            variants: Set(VariantList(variants)),
            sizes: Set(SizeList(sizes)),
            tag: Set(input.tag),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created product: {}", product.id);
        Ok(ProductWithCategory {
            product,
            category: Some(category),
        })
    }

    /// Applies the provided fields. When variants are replaced, media assets
    /// no longer referenced are deleted from the media host.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductWithCategory, ServiceError> {
        let existing = self.find_product(id).await?;

        let price = input.price.unwrap_or(existing.price);
        let discounted_price = match input.discounted_price {
            Some(value) => value,
            None => existing.discounted_price,
        };
        check_prices(price, discounted_price)?;

        let category = match input.category_id {
            Some(category_id) => self.categories.get_category(category_id).await?,
            None => self.categories.get_category(existing.category_id).await?,
        };

        let variants = input.variants.map(normalize_variants).transpose()?;
        let sizes = input.sizes.map(normalize_sizes).transpose()?;

        let stale_media = match &variants {
            Some(new_variants) => {
                let kept: HashSet<String> = VariantList(new_variants.clone())
                    .public_ids()
                    .into_iter()
                    .collect();
                existing
                    .media_public_ids()
                    .into_iter()
                    .filter(|public_id| !kept.contains(public_id))
                    .collect()
            }
            None => Vec::new(),
        };

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.price = Set(price);
        active.discounted_price = Set(discounted_price);
        active.category_id = Set(category.id);
        if let Some(variants) = variants {
            active.variants = Set(VariantList(variants));
        }
        if let Some(sizes) = sizes {
            active.sizes = Set(SizeList(sizes));
        }
        if let Some(tag) = input.tag {
            active.tag = Set(tag);
        }
        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;

        if !stale_media.is_empty() {
            let deleted = delete_assets(self.media.as_ref(), stale_media).await;
            debug!("Deleted {} stale media assets for product {}", deleted, id);
        }

        info!("Updated product: {}", id);
        Ok(ProductWithCategory {
            product,
            category: Some(category),
        })
    }

    /// Deletes the product, then all of its media assets. Cart lines that
    /// reference it are left in place.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        let existing = self.find_product(id).await?;
        existing.clone().delete(&*self.db).await?;

        let deleted = delete_assets(self.media.as_ref(), existing.media_public_ids()).await;
        info!("Deleted product {} and {} media assets", id, deleted);
        Ok(existing)
    }
}

fn check_prices(price: Decimal, discounted_price: Option<Decimal>) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "price cannot be negative".to_string(),
        ));
    }
    if let Some(discounted) = discounted_price {
        if discounted < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "discountedPrice cannot be negative".to_string(),
            ));
        }
        if discounted > price {
            return Err(ServiceError::ValidationError(
                "discountedPrice cannot exceed price".to_string(),
            ));
        }
    }
    Ok(())
}

/// At least one variant, each with a color and at least one media item.
fn normalize_variants(variants: Vec<Variant>) -> Result<Vec<Variant>, ServiceError> {
    if variants.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one variant is required".to_string(),
        ));
    }

    variants
        .into_iter()
        .map(|mut variant| {
            variant.color = variant.color.trim().to_string();
            if variant.color.is_empty() {
                return Err(ServiceError::ValidationError(
                    "variant color cannot be blank".to_string(),
                ));
            }
            if variant.media.is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "variant {} needs at least one media item",
                    variant.color
                )));
            }
            if variant.media.iter().any(|m| m.url.trim().is_empty()) {
                return Err(ServiceError::ValidationError(format!(
                    "variant {} has a media item without url",
                    variant.color
                )));
            }
            Ok(variant)
        })
        .collect()
}

/// Trims, drops blanks and duplicates; at least one size must remain.
fn normalize_sizes(sizes: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut seen = HashSet::new();
    let sizes: Vec<String> = sizes
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    if sizes.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one size is required".to_string(),
        ));
    }
    Ok(sizes)
}

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub category_id: Uuid,
    pub variants: Vec<Variant>,
    pub sizes: Vec<String>,
    pub tag: Option<ProductTag>,
}

/// `None` leaves a field as is; the nested options of `discounted_price` and
/// `tag` distinguish "clear" (`Some(None)`) from "keep".
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discounted_price: Option<Option<Decimal>>,
    pub category_id: Option<Uuid>,
    pub variants: Option<Vec<Variant>>,
    pub sizes: Option<Vec<String>>,
    pub tag: Option<Option<ProductTag>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::commerce::MediaItem;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn variant(color: &str, media: usize) -> Variant {
        Variant {
            color: color.to_string(),
            media: (0..media)
                .map(|i| MediaItem {
                    url: format!("https://cdn.example/{color}-{i}.jpg"),
                    public_id: format!("{color}-{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn variants_need_media() {
        assert_matches!(
            normalize_variants(vec![]),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            normalize_variants(vec![variant("Red", 1), variant("Blue", 0)]),
            Err(ServiceError::ValidationError(msg)) if msg.contains("Blue")
        );
        assert_eq!(
            normalize_variants(vec![variant(" Red ", 2)]).unwrap()[0].color,
            "Red"
        );
    }

    #[test]
    fn sizes_are_deduplicated() {
        assert_eq!(
            normalize_sizes(vec!["M".into(), " M".into(), "".into(), "L".into()]).unwrap(),
            vec!["M", "L"]
        );
        assert!(normalize_sizes(vec![" ".into()]).is_err());
    }

    #[test]
    fn discount_cannot_exceed_price() {
        assert!(check_prices(dec!(100), Some(dec!(80))).is_ok());
        assert!(check_prices(dec!(100), None).is_ok());
        assert!(check_prices(dec!(100), Some(dec!(120))).is_err());
        assert!(check_prices(dec!(-1), None).is_err());
    }
}
