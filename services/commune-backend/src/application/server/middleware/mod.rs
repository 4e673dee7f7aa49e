pub mod rate_limit;
pub mod resolve_context;
pub mod response_map;
