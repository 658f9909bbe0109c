pub mod api;
pub mod catalog;
pub mod dialog;
pub mod models;
pub mod session;
