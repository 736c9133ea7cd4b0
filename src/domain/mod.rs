pub mod auth;
pub mod catalog_item;
pub mod list;
pub mod list_entry;
pub mod purchase_request;
pub mod submission;
