//! Menuforge Core - Shared catalog types and resolution engine.
//!
//! This crate provides the common types used across all Menuforge components:
//! - `server` - Admin API and public menu API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure algorithms - no I/O, no
//! database access, no HTTP. Everything here operates on already-fetched
//! values, which keeps the tenant-resolution rules unit-testable without a
//! running database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, ownership model, admin roles
//! - [`catalog`] - Catalog entities: brands, stores, categories, products,
//!   option groups and items
//! - [`overrides`] - Per-store customization records for brand templates
//! - [`scope`] - Access-scope resolution from a verified identity triple
//! - [`resolve`] - The template/override merge engine
//! - [`reconcile`] - Category/option-group link reconciliation planner

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod overrides;
pub mod reconcile;
pub mod resolve;
pub mod scope;
pub mod types;

pub use types::*;
