use crate::entities::commerce::HeaderModel;
use crate::handlers::common::{
    created_response, map_service_error, normalize_optional_string, normalize_string, parse_id,
    require_non_blank, success_response, validate_input,
};
use crate::{
    errors::{ApiError, AppJson},
    services::commerce::{CreateHeaderInput, UpdateHeaderInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for header banner endpoints
pub fn headers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_headers).post(create_header))
        .route("/:id", put(update_header).delete(delete_header))
}

/// List header banners
#[utoipa::path(
    get,
    path = "/api/header",
    responses(
        (status = 200, description = "Headers retrieved", body = crate::ApiResponse<Vec<HeaderResponse>>)
    ),
    tag = "Headers"
)]
pub async fn list_headers(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let headers = state
        .services
        .headers
        .list_headers()
        .await
        .map_err(map_service_error)?;

    let headers: Vec<HeaderResponse> = headers.into_iter().map(HeaderResponse::from).collect();
    Ok(success_response("Headers retrieved", headers))
}

/// Create a header banner
#[utoipa::path(
    post,
    path = "/api/header",
    request_body = CreateHeaderRequest,
    responses(
        (status = 201, description = "Header created", body = crate::ApiResponse<HeaderResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Headers"
)]
pub async fn create_header(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHeaderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateHeaderInput {
        name: require_non_blank(payload.name, "name")?,
        description: normalize_string(payload.description),
        image_url: require_non_blank(payload.image_url, "imageUrl")?,
        tag: require_non_blank(payload.tag, "tag")?,
        image_public_id: normalize_optional_string(payload.image_public_id),
    };

    let header = state
        .services
        .headers
        .create_header(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response("Header created", HeaderResponse::from(header)))
}

/// Update a header banner
#[utoipa::path(
    put,
    path = "/api/header/{id}",
    params(("id" = Uuid, Path, description = "Header ID")),
    request_body = UpdateHeaderRequest,
    responses(
        (status = 200, description = "Header updated", body = crate::ApiResponse<HeaderResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Header not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Headers"
)]
pub async fn update_header(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateHeaderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "header")?;
    validate_input(&payload)?;

    let input = UpdateHeaderInput {
        name: payload
            .name
            .map(|name| require_non_blank(name, "name"))
            .transpose()?,
        description: payload.description.map(normalize_string),
        image_url: payload
            .image_url
            .map(|url| require_non_blank(url, "imageUrl"))
            .transpose()?,
        tag: payload
            .tag
            .map(|tag| require_non_blank(tag, "tag"))
            .transpose()?,
        image_public_id: normalize_optional_string(payload.image_public_id),
    };

    let header = state
        .services
        .headers
        .update_header(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Header updated", HeaderResponse::from(header)))
}

/// Delete a header banner and its image
#[utoipa::path(
    delete,
    path = "/api/header/{id}",
    params(("id" = Uuid, Path, description = "Header ID")),
    responses(
        (status = 200, description = "Header deleted", body = crate::ApiResponse<HeaderResponse>),
        (status = 404, description = "Header not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Headers"
)]
pub async fn delete_header(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id, "header")?;
    let header = state
        .services
        .headers
        .delete_header(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Header deleted", HeaderResponse::from(header)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHeaderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(url)]
    pub image_url: String,
    #[validate(length(min = 1, max = 50))]
    pub tag: String,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHeaderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub tag: Option<String>,
    pub image_public_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HeaderModel> for HeaderResponse {
    fn from(model: HeaderModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
            tag: model.tag,
            image_public_id: model.image_public_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
