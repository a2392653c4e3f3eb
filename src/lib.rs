pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::AppError;
pub use service::{BatchReconciler, TariffClient};
pub use store::{CsvReferenceStore, MemoryReferenceStore, ReferenceStore};
