pub mod cache;
pub mod email;
pub mod postgres;
