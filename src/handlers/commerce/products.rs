use crate::entities::commerce::{ProductModel, ProductTag, Variant};
use crate::handlers::commerce::categories::CategoryResponse;
use crate::handlers::common::{
    created_response, double_option, map_service_error, normalize_string, parse_id,
    require_non_blank, success_response, validate_input,
};
use crate::{
    errors::{ApiError, AppJson},
    services::commerce::{
        CreateProductInput, ProductFilter, ProductQuery, ProductWithCategory, UpdateProductInput,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/create", post(create_product))
        .route("/update/:id", put(update_product))
        .route("/delete/:id", delete(delete_product))
}

fn parse_tag(raw: &str) -> Result<ProductTag, ApiError> {
    ProductTag::from_str(raw.trim())
        .map_err(|_| ApiError::ValidationError(format!("Invalid tag: {raw}")))
}

/// List products matching the optional filters
#[utoipa::path(
    get,
    path = "/api/product",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products retrieved", body = crate::ApiResponse<Vec<ProductResponse>>),
        (status = 400, description = "Malformed filter", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = ProductFilter::parse(&query).map_err(map_service_error)?;

    let products = state
        .services
        .product_catalog
        .list_products(&filter)
        .await
        .map_err(map_service_error)?;

    let products: Vec<ProductResponse> =
        products.into_iter().map(ProductResponse::from).collect();
    Ok(success_response("Products retrieved", products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "product")?;
    let product = state
        .services
        .product_catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Product retrieved",
        ProductResponse::from(product),
    ))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/product/create",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateProductInput {
        name: require_non_blank(payload.name, "name")?,
        description: normalize_string(payload.description),
        price: payload.price,
        discounted_price: payload.discounted_price,
        category_id: parse_id(&payload.category_id, "category")?,
        variants: payload.variants,
        sizes: payload.sizes,
        tag: payload.tag.as_deref().map(parse_tag).transpose()?,
    };

    let product = state
        .services
        .product_catalog
        .create_product(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(
        "Product created",
        ProductResponse::from(product),
    ))
}

/// Update a product
///
/// Media assets dropped from the variants are deleted from the media host.
#[utoipa::path(
    put,
    path = "/api/product/update/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "product")?;
    validate_input(&payload)?;

    let tag = match payload.tag {
        Some(Some(raw)) => Some(Some(parse_tag(&raw)?)),
        Some(None) => Some(None),
        None => None,
    };

    let input = UpdateProductInput {
        name: payload
            .name
            .map(|name| require_non_blank(name, "name"))
            .transpose()?,
        description: payload.description.map(normalize_string),
        price: payload.price,
        discounted_price: payload.discounted_price,
        category_id: payload
            .category_id
            .as_deref()
            .map(|raw| parse_id(raw, "category"))
            .transpose()?,
        variants: payload.variants,
        sizes: payload.sizes,
        tag,
    };

    let product = state
        .services
        .product_catalog
        .update_product(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Product updated",
        ProductResponse::from(product),
    ))
}

/// Delete a product and its media assets
#[utoipa::path(
    delete,
    path = "/api/product/delete/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = crate::ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "product")?;
    let product = state
        .services
        .product_catalog
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Product deleted",
        ProductResponse::from(product),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, example = "129.99")]
    pub price: Decimal,
    #[schema(value_type = Option<String>, example = "99.99")]
    pub discounted_price: Option<Decimal>,
    /// Category id
    #[serde(alias = "category")]
    pub category_id: String,
    #[validate(length(min = 1))]
    pub variants: Vec<Variant>,
    #[validate(length(min = 1))]
    pub sizes: Vec<String>,
    /// `New`, `Trending` or `Sale`
    pub tag: Option<String>,
}

/// Missing keys are left unchanged; `null` clears `discountedPrice` and `tag`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub discounted_price: Option<Option<Decimal>>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub variants: Option<Vec<Variant>>,
    pub sizes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub tag: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "129.99")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub discounted_price: Option<Decimal>,
    pub category_id: Uuid,
    /// Populated on catalog reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    pub variants: Vec<Variant>,
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<ProductTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            discounted_price: model.discounted_price,
            category_id: model.category_id,
            category: None,
            variants: model.variants.0,
            sizes: model.sizes.0,
            tag: model.tag,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProductWithCategory> for ProductResponse {
    fn from(value: ProductWithCategory) -> Self {
        let mut response = Self::from(value.product);
        response.category = value.category.map(CategoryResponse::from);
        response
    }
}
