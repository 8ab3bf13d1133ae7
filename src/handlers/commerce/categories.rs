use crate::entities::commerce::{CategoryModel, Gender};
use crate::handlers::common::{
    created_response, map_service_error, normalize_optional_string, parse_id, require_non_blank,
    success_response, validate_input,
};
use crate::{
    errors::{ApiError, AppJson},
    services::commerce::{CreateCategoryInput, UpdateCategoryInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
        .route("/create", post(create_category))
        .route("/update/:id", put(update_category))
        .route("/delete/:id", delete(delete_category))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesQuery {
    /// `men` or `women`
    pub gender: Option<String>,
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/categorie",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Categories retrieved", body = crate::ApiResponse<Vec<CategoryResponse>>),
        (status = 400, description = "Unknown gender", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let gender = match normalize_optional_string(query.gender) {
        Some(raw) => Some(
            Gender::from_str(&raw)
                .map_err(|_| ApiError::ValidationError(format!("Invalid gender: {raw}")))?,
        ),
        None => None,
    };

    let categories = state
        .services
        .categories
        .list_categories(gender)
        .await
        .map_err(map_service_error)?;

    let categories: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from).collect();
    Ok(success_response("Categories retrieved", categories))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/api/categorie/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category retrieved", body = crate::ApiResponse<CategoryResponse>),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "category")?;
    let category = state
        .services
        .categories
        .get_category(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Category retrieved",
        CategoryResponse::from(category),
    ))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categorie/create",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = crate::ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateCategoryInput {
        name: require_non_blank(payload.name, "name")?,
        image_url: require_non_blank(payload.image_url, "imageUrl")?,
        gender: payload.gender,
        image_public_id: normalize_optional_string(payload.image_public_id),
    };

    let category = state
        .services
        .categories
        .create_category(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(
        "Category created",
        CategoryResponse::from(category),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categorie/update/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = crate::ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "category")?;
    validate_input(&payload)?;

    let input = UpdateCategoryInput {
        name: payload
            .name
            .map(|name| require_non_blank(name, "name"))
            .transpose()?,
        image_url: payload
            .image_url
            .map(|url| require_non_blank(url, "imageUrl"))
            .transpose()?,
        gender: payload.gender,
        image_public_id: normalize_optional_string(payload.image_public_id),
    };

    let category = state
        .services
        .categories
        .update_category(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Category updated",
        CategoryResponse::from(category),
    ))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categorie/delete/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = crate::ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "category")?;
    let category = state
        .services
        .categories
        .delete_category(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Category deleted",
        CategoryResponse::from(category),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub image_url: String,
    pub gender: Gender,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub gender: Option<Gender>,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "name": "Sneakers",
    "imageUrl": "https://res.cloudinary.com/demo/image/upload/sneakers.jpg",
    "gender": "men",
    "imagePublicId": "categories/sneakers",
    "createdAt": "2024-12-09T10:30:00Z",
    "updatedAt": "2024-12-09T10:30:00Z"
}))]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image_url: model.image_url,
            gender: model.gender,
            image_public_id: model.image_public_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
