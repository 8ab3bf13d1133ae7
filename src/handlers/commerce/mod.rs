/// Storefront API handlers
pub mod carts;
pub mod categories;
pub mod headers;
pub mod products;
pub mod tags;

// Re-export route builders
pub use carts::carts_routes;
pub use categories::categories_routes;
pub use headers::headers_routes;
pub use products::products_routes;
pub use tags::tags_routes;
