pub mod bar_cache;
pub mod freshness;
