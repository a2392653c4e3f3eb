pub mod intake;
pub mod reconciler;
pub mod tariff;

pub use intake::parse_upload;
pub use reconciler::BatchReconciler;
pub use tariff::TariffClient;
