//! Core types and consistency operations for the storefront platform.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! is reached only through the [`repo::Repository`] gateway trait; every
//! operation in [`service`] is a plain async function over an injected
//! gateway and explicit tenant/entity ids.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod image;
pub mod order;
pub mod repo;
pub mod service;
pub mod tenant;

pub use error::{Error, ErrorKind, Result};
