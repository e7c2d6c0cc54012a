//! Service orchestration between routes and repositories.

pub mod catalog;
pub mod links;
pub mod menu;
pub mod scope;
