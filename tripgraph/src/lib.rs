pub mod analytics;
pub mod app;
pub mod ingest;
pub mod store;
