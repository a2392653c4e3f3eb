pub mod handlers;

pub use handlers::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::service::{BatchReconciler, TariffClient};
use crate::store::CsvReferenceStore;

/// 上传订单文件大小上限
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// 共享状态
///
/// 所有请求共用同一个参考库实例, 写入在进程内串行。
/// 参考库文件只支持单个服务进程写入。
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<BatchReconciler<CsvReferenceStore>>,
    pub tariff: Arc<TariffClient>,
}

impl AppState {
    pub fn new(store: CsvReferenceStore, tariff: TariffClient) -> Self {
        Self {
            reconciler: Arc::new(BatchReconciler::new(store)),
            tariff: Arc::new(tariff),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile", post(reconcile))
        .route("/api/reconcile/upload", post(reconcile_upload))
        .route("/api/commit", post(commit))
        .route("/api/store", get(download_store).delete(clear_store))
        .route("/api/store/summary", get(store_summary))
        .route("/api/tariff/search", get(tariff_search))
        .route("/api/tariff/export", post(tariff_export))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
}
