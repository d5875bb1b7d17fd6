pub mod cache;
pub mod record;
pub mod statistics;
