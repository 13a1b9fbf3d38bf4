//! JSON REST API for the storefront.
//!
//! Exposes an axum [`Router`] backed by any
//! [`storefront_core::repo::Repository`]. Authentication happens upstream;
//! handlers read the resolved caller from request headers (see
//! [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", storefront_api::api_router(repo.clone()))
//! ```

pub mod catalog;
pub mod complements;
pub mod error;
pub mod identity;
pub mod orders;
pub mod public;
pub mod stores;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, patch, post, put},
};
use serde::Deserialize;
use storefront_core::repo::Repository;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STOREFRONT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  /// SQLite file, or `:memory:` for a throwaway database.
  pub database_path: PathBuf,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `repo`.
///
/// Routes under `/public` need no identity; every other route expects the
/// caller headers described in [`identity`].
pub fn api_router<R>(repo: Arc<R>) -> Router<()>
where
  R: Repository + 'static,
{
  Router::new()
    // Store profile and settings
    .route("/stores", post(stores::create::<R>))
    .route("/stores/me", get(stores::mine::<R>))
    .route("/store", patch(stores::update_profile::<R>))
    .route("/store/subdomain", put(stores::update_subdomain::<R>))
    .route("/settings", get(stores::get_settings::<R>).put(stores::update_settings::<R>))
    // Categories
    .route("/categories", get(catalog::list_categories::<R>).post(catalog::create_category::<R>))
    .route("/categories/order", put(catalog::reorder_categories::<R>))
    .route("/categories/duplicate", post(catalog::duplicate_category::<R>))
    .route(
      "/categories/{id}",
      patch(catalog::update_category::<R>).delete(catalog::delete_category::<R>),
    )
    // Products
    .route("/products", get(catalog::list_products::<R>).post(catalog::create_product::<R>))
    .route("/products/order", put(catalog::reorder_products::<R>))
    .route(
      "/products/{id}",
      get(catalog::get_product::<R>)
        .patch(catalog::update_product::<R>)
        .delete(catalog::delete_product::<R>),
    )
    .route("/products/{id}/complements", put(catalog::replace_links::<R>))
    // Complement groups and options
    .route(
      "/complement-groups",
      get(complements::list::<R>).post(complements::create::<R>),
    )
    .route(
      "/complement-groups/{id}",
      patch(complements::update::<R>).delete(complements::delete_group::<R>),
    )
    .route("/complement-items/{id}", delete(complements::delete_item::<R>))
    // Orders
    .route("/orders", get(orders::list::<R>).post(orders::create::<R>))
    .route("/orders/{id}", get(orders::get_one::<R>))
    .route("/orders/{id}/status", patch(orders::update_status::<R>))
    // Public storefront
    .route("/public/{subdomain}/menu", get(public::menu::<R>))
    .route("/public/{subdomain}/settings", get(public::store_settings::<R>))
    .route("/public/{subdomain}/orders", post(public::place_order::<R>))
    .with_state(repo)
}

#[cfg(test)]
mod tests;
