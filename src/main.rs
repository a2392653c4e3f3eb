use dhl_customs_clerk::{api, AppConfig, CsvReferenceStore, TariffClient};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_max_level(config.log_level())
        .init();

    info!("Starting server with config: {:?}", config);

    // SKU 参考库
    let store = CsvReferenceStore::new(config.store.path.clone());
    if store.exists() {
        info!("Reference store: {}", store.path().display());
    } else {
        info!(
            "Reference store {} not found, it will be created on first write-back",
            store.path().display()
        );
    }

    let tariff = TariffClient::new(&config.tariff)?;
    let app = api::router(api::AppState::new(store, tariff));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/reconcile          - 匹配订单行 (JSON)");
    info!("  POST   /api/reconcile/upload   - 上传订单文件并匹配 (CSV/Excel)");
    info!("  POST   /api/commit             - 回写 SKU 参考库并生成 DHL 文件");
    info!("  GET    /api/store              - 下载 SKU 参考库");
    info!("  DELETE /api/store              - 清空 SKU 参考库");
    info!("  GET    /api/tariff/search?q=   - UK 海关编码查询");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
