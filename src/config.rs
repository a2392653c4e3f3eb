use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认配置文件名 (不含扩展名, 支持 toml/yaml/json)
pub const CONFIG_FILE: &str = "customs-clerk";

/// 环境变量前缀, 例如 CLERK_SERVER__PORT=9000
pub const ENV_PREFIX: &str = "CLERK";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub tariff: TariffConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// SKU 参考库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// UK Trade Tariff 查询
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                path: PathBuf::from("sku_reference_data.csv"),
            },
            tariff: TariffConfig {
                base_url: "https://www.trade-tariff.service.gov.uk".to_string(),
                user_agent: "dhl-tariff-app/1.0 (contact@example.com)".to_string(),
                timeout_secs: 15,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 工作目录下的 customs-clerk.* -> CLERK_ 环境变量
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// 从指定配置文件 (可不存在) 加载
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("store.path", defaults.store.path.to_string_lossy().into_owned())?
            .set_default("tariff.base_url", defaults.tariff.base_url)?
            .set_default("tariff.user_agent", defaults.tariff.user_agent)?
            .set_default("tariff.timeout_secs", defaults.tariff.timeout_secs as i64)?
            .set_default("log.level", defaults.log.level)?
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 日志级别, 无法识别时回退到 INFO
    pub fn log_level(&self) -> tracing::Level {
        self.log.level.parse().unwrap_or(tracing::Level::INFO)
    }
}
