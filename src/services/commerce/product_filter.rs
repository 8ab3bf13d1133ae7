//! Product listing filters.
//!
//! Query parameters arrive as comma separated strings. Equality predicates
//! (category, resolved category set, tag) become a database [`Condition`];
//! size, color and price are checked in process against the fetched rows.

use crate::{
    entities::commerce::{product, Gender, ProductModel, ProductTag},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

/// Raw query string of `GET /api/product`
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Category id
    pub category: Option<String>,
    /// Comma separated sizes, e.g. `40,41`
    pub size: Option<String>,
    /// Comma separated variant colors
    pub colors: Option<String>,
    /// Comma separated genders (`men`, `women`)
    pub gender: Option<String>,
    /// Comma separated product tags (`New`, `Trending`, `Sale`)
    pub tags: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub sizes: Vec<String>,
    /// Lowercased
    pub colors: Vec<String>,
    pub genders: Vec<Gender>,
    pub tags: Vec<ProductTag>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

fn split_list(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_price(raw: Option<&str>, name: &str) -> Result<Option<Decimal>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => Decimal::from_str(value)
            .map(Some)
            .map_err(|_| ServiceError::ValidationError(format!("{name} must be a number"))),
    }
}

impl ProductFilter {
    pub fn parse(query: &ProductQuery) -> Result<Self, ServiceError> {
        let category = match query.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Invalid category id: {raw}"))
            })?),
        };

        let genders = split_list(query.gender.as_deref())
            .into_iter()
            .map(|g| {
                Gender::from_str(g)
                    .map_err(|_| ServiceError::ValidationError(format!("Invalid gender: {g}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tags = split_list(query.tags.as_deref())
            .into_iter()
            .map(|t| {
                ProductTag::from_str(t)
                    .map_err(|_| ServiceError::ValidationError(format!("Invalid tag: {t}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let min_price = parse_price(query.min_price.as_deref(), "minPrice")?;
        let max_price = parse_price(query.max_price.as_deref(), "maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(ServiceError::ValidationError(
                    "minPrice must not exceed maxPrice".to_string(),
                ));
            }
        }

        Ok(Self {
            category,
            sizes: split_list(query.size.as_deref())
                .into_iter()
                .map(str::to_string)
                .collect(),
            colors: split_list(query.colors.as_deref())
                .into_iter()
                .map(str::to_lowercase)
                .collect(),
            genders,
            tags,
            min_price,
            max_price,
        })
    }

    pub fn needs_category_lookup(&self) -> bool {
        !self.genders.is_empty()
    }

    /// Database side of the filter. `category_ids` is the set resolved from
    /// the gender lookup, if one was made.
    pub fn condition(&self, category_ids: Option<&[Uuid]>) -> Condition {
        let mut condition = Condition::all();
        if let Some(category) = self.category {
            condition = condition.add(product::Column::CategoryId.eq(category));
        }
        if let Some(ids) = category_ids {
            condition = condition.add(product::Column::CategoryId.is_in(ids.iter().copied()));
        }
        if !self.tags.is_empty() {
            condition = condition.add(product::Column::Tag.is_in(self.tags.iter().copied()));
        }
        condition
    }

    /// In-process predicates: sizes, colors and price range.
    pub fn matches(&self, product: &ProductModel) -> bool {
        self.matches_sizes(product) && self.matches_colors(product) && self.matches_price(product)
    }

    fn matches_sizes(&self, product: &ProductModel) -> bool {
        self.sizes.is_empty() || self.sizes.iter().any(|s| product.offers_size(s))
    }

    fn matches_colors(&self, product: &ProductModel) -> bool {
        self.colors.is_empty() || self.colors.iter().any(|c| product.offers_color(c))
    }

    /// The discounted price is checked when present, otherwise the list price.
    fn matches_price(&self, product: &ProductModel) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        let in_range = |price: Decimal| {
            self.min_price.map_or(true, |min| price >= min)
                && self.max_price.map_or(true, |max| price <= max)
        };
        match product.discounted_price {
            Some(discounted) => in_range(discounted),
            None => in_range(product.price),
        }
    }
}
