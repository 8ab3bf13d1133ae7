use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::commerce::{carts, categories, headers, products, tags};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

Catalog, content and cart backend for the storefront and its back-office.

- **Categories**: men's and women's categories with an image
- **Products**: color variants with media, sizes, prices and an optional tag
- **Tags** and **Headers**: marketing labels and promotional banners
- **Cart**: one cart per user, lines merged by product and size

Every success response is wrapped as
`{ "success": true, "message": "...", "data": ..., "meta": { "requestId", "timestamp" } }`.
Errors use:

```json
{
  "error": "Bad Request",
  "message": "Validation error: size XL is not available for this product",
  "requestId": "2f0c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "Categories", description = "Category management"),
        (name = "Products", description = "Product catalog and filtering"),
        (name = "Tags", description = "Marketing tags"),
        (name = "Headers", description = "Header banners"),
        (name = "Cart", description = "Per-user shopping carts"),
        (name = "Health", description = "Service health")
    ),
    paths(
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        tags::list_tags,
        tags::get_tag,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag,
        headers::list_headers,
        headers::create_header,
        headers::update_header,
        headers::delete_header,
        carts::get_cart,
        carts::add_to_cart,
        carts::update_cart_item,
        carts::remove_cart_item,
        carts::checkout_link,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::entities::commerce::Gender,
            crate::entities::commerce::ProductTag,
            crate::entities::commerce::Variant,
            crate::entities::commerce::MediaItem,
            crate::errors::ErrorResponse,
            crate::ResponseMeta,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
