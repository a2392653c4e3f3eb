use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dhl_customs_clerk::api::{self, AppState};
use dhl_customs_clerk::config::AppConfig;
use dhl_customs_clerk::{CsvReferenceStore, ReferenceStore, TariffClient};

const STORE_CSV: &str = "Item Description,Commodity Code,Weight,Origin Country\nLV SPEEDY BAG,42022100,0.9,CN\n";

fn app_with_store(dir: &tempfile::TempDir, content: Option<&str>) -> (Router, CsvReferenceStore) {
    let path = dir.path().join("sku_reference_data.csv");
    if let Some(content) = content {
        std::fs::write(&path, content).unwrap();
    }
    let mut tariff = AppConfig::default().tariff;
    tariff.base_url = "http://127.0.0.1:9".to_string();

    let store = CsvReferenceStore::new(&path);
    let state = AppState::new(store.clone(), TariffClient::new(&tariff).unwrap());
    (api::router(state), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, Body::from(body.to_string())).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with_store(&dir, None);

    let (status, body) = send(&app, Method::GET, "/health", Body::empty()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn reconcile_then_commit_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app_with_store(&dir, Some(STORE_CSV));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/reconcile",
        json!({"items": [
            {"description": "LV SPEEDY BAG", "selling_price": "1200"},
            {"description": "GUCCI BELT", "selling_price": "800"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["summary"]["matched"], 1);
    assert_eq!(data["summary"]["unmatched"], 1);
    assert_eq!(data["summary"]["total"], 2);
    assert_eq!(data["items"][0]["commodity_code"], "42022100");
    assert_eq!(data["items"][1]["commodity_code"], "");
    assert_eq!(data["items"][1]["matched"], false);

    // 用户补全第二行并勾选回写
    let mut items = data["items"].clone();
    items[1]["commodity_code"] = json!("42033000");
    items[1]["weight"] = json!("0.3");
    items[1]["origin_country"] = json!("IT");
    items[1]["write_back"] = json!(true);

    let (status, body) =
        send_json(&app, Method::POST, "/api/commit", json!({ "items": items })).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(
        data["export_csv"],
        "1,INV_ITEM,LV SPEEDY BAG,4202.21.00,1,PCS,1200,GBP,0.9,,CN,,,\n\
         1,INV_ITEM,GUCCI BELT,4203.30.00,1,PCS,800,GBP,0.3,,IT,,,\n"
    );
    assert_eq!(data["export_columns"].as_array().unwrap().len(), 14);
    assert_eq!(data["export_columns"][3], "Commodity Code");
    assert_eq!(data["export_columns"][6], "Selling Price");
    assert_eq!(data["new_records"].as_array().unwrap().len(), 1);
    assert_eq!(
        data["new_records_csv"],
        "Item Description,Commodity Code,Weight,Origin Country\nGUCCI BELT,42033000,0.3,IT\n"
    );

    let found = store.lookup("gucci belt").unwrap();
    assert_eq!(found.commodity_code(), "42033000");
}

#[tokio::test]
async fn commit_without_write_back_leaves_store_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app_with_store(&dir, None);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/commit",
        json!({"items": [{
            "description": "GUCCI BELT",
            "selling_price": 800.5,
            "commodity_code": "42033000",
            "weight": "0.3",
            "origin_country": "IT"
        }]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["new_records_csv"].is_null());
    assert_eq!(
        body["data"]["export_csv"],
        "1,INV_ITEM,GUCCI BELT,4203.30.00,1,PCS,800.5,GBP,0.3,,IT,,,\n"
    );
    assert!(!store.exists());
}

#[tokio::test]
async fn upload_csv_is_reconciled() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with_store(&dir, Some(STORE_CSV));
    let csv = "Order,item description,SELLING PRICE\n1,lv speedy bag,1200\n2,PRADA SHOULDER BAG,950\n";

    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/reconcile/upload?file_name=orders.csv",
        Body::from(csv),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["summary"]["matched"], 1);
    assert_eq!(body["data"]["items"][0]["origin_country"], "CN");
    assert_eq!(body["data"]["items"][1]["matched"], false);
}

#[tokio::test]
async fn upload_without_required_columns_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with_store(&dir, None);

    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/reconcile/upload?file_name=orders.csv",
        Body::from("Description,Price\nLV SPEEDY BAG,1200\n"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Item Description"));
}

#[tokio::test]
async fn store_download_summary_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (app, store) = app_with_store(&dir, Some(STORE_CSV));

    let (status, bytes) = send(&app, Method::GET, "/api/store", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, STORE_CSV.as_bytes());

    let (status, body) = send_json(&app, Method::GET, "/api/store/summary", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["exists"], true);
    assert_eq!(body["data"]["record_count"], 1);

    let (status, _) = send(&app, Method::DELETE, "/api/store", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!store.exists());

    let (status, _) = send(&app, Method::GET, "/api/store", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&app, Method::GET, "/api/store/summary", Value::Null).await;
    assert_eq!(body["data"]["exists"], false);
    assert_eq!(body["data"]["record_count"], 0);
}

#[tokio::test]
async fn blank_tariff_query_returns_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with_store(&dir, None);

    let (status, body) = send_json(&app, Method::GET, "/api/tariff/search?q=", Value::Null).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn tariff_selection_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with_store(&dir, None);

    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/tariff/export",
        Body::from(
            json!([{
                "commodity_code": "4202210000",
                "description": "Handbags",
                "official_link": "https://www.trade-tariff.service.gov.uk/commodities/4202210000"
            }])
            .to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Commodity Code,Description,Official Link\n4202210000,Handbags,https://www.trade-tariff.service.gov.uk/commodities/4202210000\n"
    );
}
