// Adapters layer: concrete implementations for external systems (portal http, local files).

pub mod http;
pub mod storage;
