use crate::api::AppState;
use crate::error::AppError;
use crate::models::{
    render_export_csv, CommitOutcome, ExportRow, InputItem, LineItem, ReconcileOutcome,
    ReferenceRecord, TariffCandidate, EXPORT_COLUMNS, EXPORT_FILE_NAME,
};
use crate::service::{parse_upload, tariff};
use crate::store::{csv_file::render_records_csv, ReferenceStore};
use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;

/// 新增记录下载文件名
pub const NEW_RECORDS_FILE_NAME: &str = "new_sku_records.csv";
pub const STORE_FILE_NAME: &str = "sku_reference_data.csv";
pub const TARIFF_EXPORT_FILE_NAME: &str = "selected_uk_tariff_codes.csv";

/// 通用响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// 请求体: 订单行
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub items: Vec<InputItem>,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: String,
}

/// 请求体: 用户编辑后的商品行
#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    pub items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub committed_at: DateTime<Utc>,
    pub new_records: Vec<ReferenceRecord>,
    /// 预览表头
    pub export_columns: [&'static str; 14],
    pub export_rows: Vec<ExportRow>,
    /// DHL_ready_file.csv 内容 (无表头)
    pub export_csv: String,
    /// new_sku_records.csv 内容, 无新增时为空
    pub new_records_csv: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSummary {
    pub exists: bool,
    pub record_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TariffQuery {
    #[serde(default)]
    pub q: String,
}

fn success<T: Serialize>(message: String, data: T) -> Response {
    let body = ApiResponse {
        success: true,
        message,
        data: Some(data),
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        message,
        data: None,
    };
    (status, Json(body)).into_response()
}

fn error_response(e: &AppError) -> Response {
    let status = if e.is_bad_input() {
        StatusCode::BAD_REQUEST
    } else if matches!(e, AppError::Tariff(_)) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::error!("Request failed: {}", e);
    failure(status, format!("Error: {}", e))
}

fn csv_download(file_name: &str, body: impl Into<axum::body::Body>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body.into(),
    )
        .into_response()
}

/// 在阻塞线程池中执行参考库相关的文件操作
async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Blocking task failed: {}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
    })
}

fn reconcile_message(outcome: &ReconcileOutcome) -> String {
    let s = &outcome.summary;
    format!(
        "Matched {} of {} items, {} need manual completion",
        s.matched, s.total, s.unmatched
    )
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 匹配订单行 (JSON)
pub async fn reconcile(
    State(state): State<AppState>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    let reconciler = state.reconciler.clone();
    match blocking(move || reconciler.reconcile(&req.items)).await {
        Ok(outcome) => success(reconcile_message(&outcome), outcome),
        Err(resp) => resp,
    }
}

/// 上传订单文件 (CSV / Excel) 并匹配
pub async fn reconcile_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Response {
    let reconciler = state.reconciler.clone();
    let result = blocking(move || {
        let items = parse_upload(&params.file_name, &body)?;
        Ok::<_, AppError>(reconciler.reconcile(&items))
    })
    .await;

    match result {
        Ok(Ok(outcome)) => success(reconcile_message(&outcome), outcome),
        Ok(Err(e)) => error_response(&e),
        Err(resp) => resp,
    }
}

/// 提交编辑结果: 回写参考库并生成 DHL 导出
pub async fn commit(State(state): State<AppState>, Json(req): Json<CommitRequest>) -> Response {
    let reconciler = state.reconciler.clone();
    let outcome: CommitOutcome = match blocking(move || reconciler.commit(&req.items)).await {
        Ok(outcome) => outcome,
        Err(resp) => return resp,
    };

    let export_csv = match render_export_csv(&outcome.export_rows) {
        Ok(csv) => csv,
        Err(e) => return error_response(&e),
    };
    let new_records_csv = if outcome.new_records.is_empty() {
        None
    } else {
        match render_records_csv(&outcome.new_records) {
            Ok(csv) => Some(csv),
            Err(e) => return error_response(&e),
        }
    };

    let message = format!(
        "Exported {} rows to {}, {} new records written to reference store (see {})",
        outcome.export_rows.len(),
        EXPORT_FILE_NAME,
        outcome.new_records.len(),
        NEW_RECORDS_FILE_NAME
    );
    let response = CommitResponse {
        committed_at: outcome.committed_at,
        new_records: outcome.new_records,
        export_columns: EXPORT_COLUMNS,
        export_rows: outcome.export_rows,
        export_csv,
        new_records_csv,
    };
    success(message, response)
}

/// 下载 SKU 参考库
pub async fn download_store(State(state): State<AppState>) -> Response {
    let path = state.reconciler.store().path().to_path_buf();
    match tokio::fs::read(&path).await {
        Ok(bytes) => csv_download(STORE_FILE_NAME, bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => failure(
            StatusCode::NOT_FOUND,
            "Reference store has not been created yet".to_string(),
        ),
        Err(e) => error_response(&AppError::Io(e)),
    }
}

/// 参考库概况
pub async fn store_summary(State(state): State<AppState>) -> Response {
    let reconciler = state.reconciler.clone();
    let summary = blocking(move || {
        let store = reconciler.store();
        StoreSummary {
            exists: store.exists(),
            record_count: store.records().len(),
        }
    })
    .await;

    match summary {
        Ok(summary) => success(
            format!("{} records in reference store", summary.record_count),
            summary,
        ),
        Err(resp) => resp,
    }
}

/// 清空参考库 (删除文件)
pub async fn clear_store(State(state): State<AppState>) -> Response {
    match state.reconciler.store().clear() {
        Ok(()) => success("Reference store cleared".to_string(), ()),
        Err(e) => error_response(&e),
    }
}

/// UK Trade Tariff 自由文本查询
pub async fn tariff_search(
    State(state): State<AppState>,
    Query(query): Query<TariffQuery>,
) -> Response {
    match state.tariff.search(&query.q).await {
        Ok(candidates) if candidates.is_empty() => success(
            "No results found. Please try a different description.".to_string(),
            candidates,
        ),
        Ok(candidates) => success(
            format!("Found {} commodity codes", candidates.len()),
            candidates,
        ),
        Err(e) => error_response(&e),
    }
}

/// 导出选中的候选编码
pub async fn tariff_export(Json(selected): Json<Vec<TariffCandidate>>) -> Response {
    match tariff::render_candidates_csv(&selected) {
        Ok(csv) => csv_download(TARIFF_EXPORT_FILE_NAME, csv),
        Err(e) => error_response(&e),
    }
}
