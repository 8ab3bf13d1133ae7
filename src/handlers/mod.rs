pub mod commerce;
pub mod common;
pub mod health;

use crate::db::DbPool;
use crate::services::commerce::{
    CartService, CategoryService, HeaderService, ProductCatalogService, TagService,
};
use crate::services::media::MediaHost;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub product_catalog: Arc<ProductCatalogService>,
    pub tags: Arc<TagService>,
    pub headers: Arc<HeaderService>,
    pub cart: Arc<CartService>,
}

impl AppServices {
    /// Wires every service to the shared pool and media host.
    pub fn new(db_pool: Arc<DbPool>, media: Arc<dyn MediaHost>) -> Self {
        let categories = Arc::new(CategoryService::new(db_pool.clone(), media.clone()));
        let product_catalog = Arc::new(ProductCatalogService::new(
            db_pool.clone(),
            categories.clone(),
            media.clone(),
        ));

        Self {
            categories,
            product_catalog,
            tags: Arc::new(TagService::new(db_pool.clone())),
            headers: Arc::new(HeaderService::new(db_pool.clone(), media)),
            cart: Arc::new(CartService::new(db_pool)),
        }
    }
}
