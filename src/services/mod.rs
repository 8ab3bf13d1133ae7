// Storefront business logic
pub mod commerce;

// External services
pub mod media;
