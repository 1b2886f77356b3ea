// Services module - catalog state and view-facing adapters

pub mod catalog_store;
pub mod dashboard;

#[cfg(test)]
pub(crate) mod mocks;

pub use catalog_store::{CatalogSnapshot, MenuCatalogStore};
pub use dashboard::{MenuDashboard, Notifier};
