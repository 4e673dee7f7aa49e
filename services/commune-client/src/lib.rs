pub mod api;
pub mod form;
pub mod opts;
pub mod routes;
