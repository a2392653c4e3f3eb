use std::fmt;

/// 应用错误
#[derive(Debug)]
pub enum AppError {
    /// 文件读写错误 (参考库、导出)
    Io(std::io::Error),
    /// CSV 读写错误
    Csv(csv::Error),
    /// Excel 解析错误
    Spreadsheet(String),
    /// 不支持的上传文件类型
    UnsupportedFormat(String),
    /// 上传文件缺少必需列
    MissingColumns(Vec<String>),
    /// 售价无法解析 (row 为表格中的行号, 从 1 开始, 含表头)
    InvalidPrice { row: usize, value: String },
    /// 海关编码查询接口错误
    Tariff(reqwest::Error),
    /// 配置加载错误
    Config(config::ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
            Self::Spreadsheet(msg) => write!(f, "spreadsheet error: {msg}"),
            Self::UnsupportedFormat(name) => {
                write!(f, "unsupported file type '{name}', expected CSV or Excel")
            }
            Self::MissingColumns(columns) => {
                write!(f, "missing required column(s): {}", columns.join(", "))
            }
            Self::InvalidPrice { row, value } => {
                write!(f, "row {row}: cannot parse selling price '{value}'")
            }
            Self::Tariff(e) => write!(f, "tariff lookup failed: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Tariff(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl AppError {
    /// 是否属于上传内容本身的问题 (应提示用户修正文件)
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::Spreadsheet(_)
                | Self::UnsupportedFormat(_)
                | Self::MissingColumns(_)
                | Self::InvalidPrice { .. }
                | Self::Csv(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        Self::Spreadsheet(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        Self::Tariff(e)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e)
    }
}
