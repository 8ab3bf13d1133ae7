/// Storefront services: catalog, content and carts
pub mod cart_service;
pub mod category_service;
pub mod header_service;
pub mod product_catalog_service;
pub mod product_filter;
pub mod tag_service;

// Re-export services for convenience
pub use cart_service::{
    AddToCartInput, CartLine, CartRemoval, CartService, CartWithItems, UpdateCartItemInput,
};
pub use category_service::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use header_service::{CreateHeaderInput, HeaderService, UpdateHeaderInput};
pub use product_catalog_service::{
    CreateProductInput, ProductCatalogService, ProductWithCategory, UpdateProductInput,
};
pub use product_filter::{ProductFilter, ProductQuery};
pub use tag_service::TagService;
