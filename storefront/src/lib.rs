// storefront/src/lib.rs

//! Pizzeria storefront: a pizza menu, per-user carts and orders, served over HTTP.
//!
//! Cart and order mutations run as `pizzeria_flow` pipelines over a transactional
//! `Store`, either PostgreSQL or an in-process store.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod pricing;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
