//! Services orchestrating the auth core and the document store

mod accounts;
mod catalog;

pub use accounts::AccountService;
pub use catalog::CatalogService;
