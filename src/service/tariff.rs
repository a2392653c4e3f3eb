use serde_json::Value;
use std::time::Duration;

use crate::config::TariffConfig;
use crate::error::AppError;
use crate::models::TariffCandidate;

/// UK Trade Tariff 自由文本查询客户端
#[derive(Debug, Clone)]
pub struct TariffClient {
    http: reqwest::Client,
    base_url: String,
}

impl TariffClient {
    pub fn new(config: &TariffConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 按商品描述查询候选编码; 空查询不发请求
    pub async fn search(&self, query: &str) -> Result<Vec<TariffCandidate>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/v2/search", self.base_url);
        let resp = self.http.get(&url).query(&[("q", query)]).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        // 非 JSON 响应按无结果处理
        let Ok(data) = serde_json::from_slice::<Value>(&body) else {
            tracing::warn!("Tariff search '{}' returned non-JSON body (HTTP {})", query, status);
            return Ok(Vec::new());
        };

        let candidates = parse_search_response(&self.base_url, &data);
        tracing::info!("Tariff search '{}': {} commodity codes", query, candidates.len());
        Ok(candidates)
    }
}

/// 从 `data[]` 中取出 type 为 commodity 且编码、描述均非空的条目
pub fn parse_search_response(base_url: &str, data: &Value) -> Vec<TariffCandidate> {
    let Some(entries) = data.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|e| e.get("type").and_then(Value::as_str) == Some("commodity"))
        .filter_map(|e| {
            let code = e.get("id").and_then(Value::as_str).unwrap_or_default();
            let desc = e
                .pointer("/attributes/description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if code.is_empty() || desc.is_empty() {
                return None;
            }
            Some(TariffCandidate {
                commodity_code: code.to_string(),
                description: desc.to_string(),
                official_link: format!("{base_url}/commodities/{code}"),
            })
        })
        .collect()
}

/// 导出选中的候选编码 (带表头)
pub fn render_candidates_csv(candidates: &[TariffCandidate]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Commodity Code", "Description", "Official Link"])?;
    for c in candidates {
        writer.write_record([&c.commodity_code, &c.description, &c.official_link])?;
    }
    let buf = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    String::from_utf8(buf)
        .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
