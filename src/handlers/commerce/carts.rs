use crate::handlers::commerce::products::ProductResponse;
use crate::handlers::common::{
    map_service_error, normalize_optional_string, parse_id, require_non_blank, success_response,
    validate_input,
};
use crate::{
    errors::{ApiError, AppJson},
    services::commerce::{
        AddToCartInput, CartLine, CartRemoval, CartWithItems, UpdateCartItemInput,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(add_to_cart))
        .route("/update", put(update_cart_item))
        .route("/delete/:cart_id/:product_id", delete(remove_cart_item))
        .route("/:user_id", get(get_cart))
        .route("/:user_id/checkout-link", get(checkout_link))
}

fn default_quantity() -> i32 {
    1
}

/// Get a user's cart with products populated
#[utoipa::path(
    get,
    path = "/api/cart/{userId}",
    params(("userId" = String, Path, description = "Opaque user identifier")),
    responses(
        (status = 200, description = "Cart retrieved", body = crate::ApiResponse<CartResponse>),
        (status = 404, description = "User has no cart", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart_for_user(&user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Cart retrieved", CartResponse::from(cart)))
}

/// Add a product to the user's cart
///
/// The cart is created on first use. Adding a `(product, size)` pair that is
/// already in the cart increases that line's quantity.
#[utoipa::path(
    post,
    path = "/api/cart/create",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = crate::ApiResponse<CartResponse>),
        (status = 400, description = "Invalid payload, size or color", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddToCartInput {
        user_id: require_non_blank(payload.user_id, "userId")?,
        product_id: parse_id(&payload.product_id, "product")?,
        quantity: payload.quantity,
        size: require_non_blank(payload.size, "size")?,
        color: normalize_optional_string(payload.color),
    };

    let cart = state
        .services
        .cart
        .add_to_cart(input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Item added to cart", CartResponse::from(cart)))
}

/// Change quantity, size or color of a cart line
#[utoipa::path(
    put,
    path = "/api/cart/update",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Cart updated", body = crate::ApiResponse<CartResponse>),
        (status = 400, description = "Invalid payload, size or color", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart, product or line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateCartRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = UpdateCartItemInput {
        cart_id: parse_id(&payload.cart_id, "cart")?,
        product_id: parse_id(&payload.product_id, "product")?,
        size: require_non_blank(payload.size, "size")?,
        quantity: payload.quantity,
        new_size: normalize_optional_string(payload.new_size),
        color: normalize_optional_string(payload.color),
    };

    let cart = state
        .services
        .cart
        .update_item(input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response("Cart updated", CartResponse::from(cart)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveItemQuery {
    /// Only remove the line with this size; all lines of the product otherwise
    pub size: Option<String>,
}

/// Remove a product from a cart
///
/// The cart is deleted when its last line is removed.
#[utoipa::path(
    delete,
    path = "/api/cart/delete/{cartId}/{productId}",
    params(
        ("cartId" = Uuid, Path, description = "Cart ID"),
        ("productId" = Uuid, Path, description = "Product ID"),
        RemoveItemQuery
    ),
    responses(
        (status = 200, description = "Item removed", body = crate::ApiResponse<RemoveItemResponse>),
        (status = 404, description = "Cart or line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Query(query): Query<RemoveItemQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart_id = parse_id(&cart_id, "cart")?;
    let product_id = parse_id(&product_id, "product")?;
    let size = normalize_optional_string(query.size);

    let removal = state
        .services
        .cart
        .remove_item(cart_id, product_id, size.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(match removal {
        CartRemoval::Updated(cart) => success_response(
            "Item removed from cart",
            RemoveItemResponse {
                cart_id,
                cart_deleted: false,
                cart: Some(CartResponse::from(cart)),
            },
        ),
        CartRemoval::CartDeleted(cart_id) => success_response(
            "Cart is empty and was deleted",
            RemoveItemResponse {
                cart_id,
                cart_deleted: true,
                cart: None,
            },
        ),
    })
}

/// WhatsApp checkout link for the user's cart
#[utoipa::path(
    get,
    path = "/api/cart/{userId}/checkout-link",
    params(("userId" = String, Path, description = "Opaque user identifier")),
    responses(
        (status = 200, description = "Checkout link built", body = crate::ApiResponse<CheckoutLinkResponse>),
        (status = 400, description = "Checkout not configured", body = crate::errors::ErrorResponse),
        (status = 404, description = "User has no cart", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn checkout_link(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let url = state
        .services
        .cart
        .checkout_link(&user_id, state.config.whatsapp_number.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        "Checkout link created",
        CheckoutLinkResponse { url },
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub product_id: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(min = 1))]
    pub size: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub cart_id: String,
    pub product_id: String,
    /// Size of the line to change
    #[validate(length(min = 1))]
    pub size: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i32>,
    pub new_size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Absent when the product was deleted from the catalog
    pub product: Option<ProductResponse>,
    pub quantity: i32,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.item.id,
            product_id: line.item.product_id,
            product: line.product.map(ProductResponse::from),
            quantity: line.item.quantity,
            size: line.item.size,
            color: line.item.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: String,
    /// Size of the first line added
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub items: Vec<CartItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CartWithItems> for CartResponse {
    fn from(value: CartWithItems) -> Self {
        Self {
            id: value.cart.id,
            user_id: value.cart.user_id,
            size: value.cart.size,
            items: value.items.into_iter().map(CartItemResponse::from).collect(),
            created_at: value.cart.created_at,
            updated_at: value.cart.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemResponse {
    pub cart_id: Uuid,
    pub cart_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutLinkResponse {
    #[schema(example = "https://wa.me/5215512345678?text=Hello%21")]
    pub url: String,
}
