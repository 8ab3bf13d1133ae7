use crate::entities::commerce::TagModel;
use crate::handlers::common::{
    created_response, map_service_error, parse_id, success_response, validate_input,
};
use crate::{
    errors::{ApiError, AppJson},
    AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for tag endpoints
pub fn tags_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", get(get_tag).put(update_tag).delete(delete_tag))
}

/// List tags
#[utoipa::path(
    get,
    path = "/api/tag/tags",
    responses(
        (status = 200, description = "Tags retrieved", body = crate::ApiResponse<Vec<TagResponse>>)
    ),
    tag = "Tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let tags = state
        .services
        .tags
        .list_tags()
        .await
        .map_err(map_service_error)?;

    let tags: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();
    Ok(success_response("Tags retrieved", tags))
}

/// Get a tag by ID
#[utoipa::path(
    get,
    path = "/api/tag/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag retrieved", body = crate::ApiResponse<TagResponse>),
        (status = 404, description = "Tag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "tag")?;
    let tag = state
        .services
        .tags
        .get_tag(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Tag retrieved", TagResponse::from(tag)))
}

/// Create a tag; names are unique ignoring case
#[utoipa::path(
    post,
    path = "/api/tag/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = crate::ApiResponse<TagResponse>),
        (status = 400, description = "Blank or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TagRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let tag = state
        .services
        .tags
        .create_tag(payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(created_response("Tag created", TagResponse::from(tag)))
}

/// Rename a tag
#[utoipa::path(
    put,
    path = "/api/tag/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag updated", body = crate::ApiResponse<TagResponse>),
        (status = 400, description = "Blank or duplicate name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Tag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TagRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "tag")?;
    validate_input(&payload)?;

    let tag = state
        .services
        .tags
        .update_tag(id, payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Tag updated", TagResponse::from(tag)))
}

/// Delete a tag
#[utoipa::path(
    delete,
    path = "/api/tag/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag deleted", body = crate::ApiResponse<TagResponse>),
        (status = 404, description = "Tag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "tag")?;
    let tag = state
        .services
        .tags
        .delete_tag(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Tag deleted", TagResponse::from(tag)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "Summer")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TagModel> for TagResponse {
    fn from(model: TagModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
