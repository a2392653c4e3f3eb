use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{LineItem, ReferenceRecord};
use crate::error::AppError;

/// 导出文件名
pub const EXPORT_FILE_NAME: &str = "DHL_ready_file.csv";

/// DHL 导出列名 (导出文件本身不带表头, 仅用于预览)
pub const EXPORT_COLUMNS: [&str; 14] = [
    "Unique Item Number",
    "Item",
    "Item Description",
    "Commodity Code",
    "Quantity",
    "Units",
    "Selling Price",
    "Currency",
    "Weight",
    "Weight 2",
    "Country of Origin",
    "Reference Type",
    "Reference Details",
    "Tax Paid",
];

pub const UNIQUE_ITEM_NUMBER: u32 = 1;
pub const ITEM_KIND: &str = "INV_ITEM";
pub const QUANTITY: u32 = 1;
pub const UNITS: &str = "PCS";
pub const CURRENCY: &str = "GBP";

/// 海关编码格式化: 去掉非数字字符后恰好 8 位则输出 dddd.dd.dd, 否则原样返回
pub fn format_commodity_code(code: &str) -> String {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 8 {
        format!("{}.{}.{}", &digits[..4], &digits[4..6], &digits[6..])
    } else {
        code.to_string()
    }
}

/// DHL 导出行 (固定 14 列)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub unique_item_number: u32,
    pub item: String,
    pub description: String,
    pub commodity_code: String,
    pub quantity: u32,
    pub units: String,
    pub selling_price: BigDecimal,
    pub currency: String,
    pub weight: String,
    pub weight_2: String,
    pub origin_country: String,
    pub reference_type: String,
    pub reference_details: String,
    pub tax_paid: String,
}

impl ExportRow {
    /// 未填写的字段在此处转为空字符串
    pub fn from_line_item(item: &LineItem) -> Self {
        let code = item.commodity_code.as_deref().unwrap_or_default();
        Self {
            unique_item_number: UNIQUE_ITEM_NUMBER,
            item: ITEM_KIND.to_string(),
            description: item.description.clone(),
            commodity_code: format_commodity_code(code),
            quantity: QUANTITY,
            units: UNITS.to_string(),
            selling_price: item.selling_price.clone(),
            currency: CURRENCY.to_string(),
            weight: item.weight.clone().unwrap_or_default(),
            weight_2: String::new(),
            origin_country: item.origin_country.clone().unwrap_or_default(),
            reference_type: String::new(),
            reference_details: String::new(),
            tax_paid: String::new(),
        }
    }

    /// 按导出列顺序输出
    pub fn to_fields(&self) -> [String; 14] {
        [
            self.unique_item_number.to_string(),
            self.item.clone(),
            self.description.clone(),
            self.commodity_code.clone(),
            self.quantity.to_string(),
            self.units.clone(),
            self.selling_price.to_string(),
            self.currency.clone(),
            self.weight.clone(),
            self.weight_2.clone(),
            self.origin_country.clone(),
            self.reference_type.clone(),
            self.reference_details.clone(),
            self.tax_paid.clone(),
        ]
    }
}

/// DHL 导出 CSV (不带表头)
pub fn render_export_csv(rows: &[ExportRow]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row.to_fields())?;
    }
    let buf = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    String::from_utf8(buf)
        .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// commit 结果
#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub committed_at: DateTime<Utc>,
    /// 本次新写入参考库的记录
    pub new_records: Vec<ReferenceRecord>,
    pub export_rows: Vec<ExportRow>,
}
