mod client;
mod error;
mod store_config;

pub use client::StoreClient;
pub use error::StoreError;
pub use store_config::StoreConfig;
