pub mod ci;
pub mod database;
pub mod test;
