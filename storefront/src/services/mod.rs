// storefront/src/services/mod.rs

pub mod catalog;
pub mod identity;
pub mod storefront;
