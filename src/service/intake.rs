use bigdecimal::BigDecimal;
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::InputItem;

pub const DESCRIPTION_COLUMN: &str = "Item Description";
pub const PRICE_COLUMN: &str = "Selling Price";

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 解析上传的订单文件 (CSV / Excel), 只保留商品描述和售价两列
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<InputItem>, AppError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let rows = if extension == "csv" {
        read_csv_rows(bytes)?
    } else if EXCEL_EXTENSIONS.contains(&extension.as_str()) {
        read_sheet_rows(bytes)?
    } else {
        return Err(AppError::UnsupportedFormat(file_name.to_string()));
    };

    let items = extract_items(&rows)?;
    tracing::info!("Parsed {}: {} order rows", file_name, items.len());
    Ok(items)
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// 读取第一个工作表
fn read_sheet_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("No worksheet found".to_string()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

/// 表头 (第一行) 中按名称定位两列, 忽略大小写和首尾空白
fn extract_items(rows: &[Vec<String>]) -> Result<Vec<InputItem>, AppError> {
    let Some((header, body)) = rows.split_first() else {
        return Err(AppError::MissingColumns(vec![
            DESCRIPTION_COLUMN.to_string(),
            PRICE_COLUMN.to_string(),
        ]));
    };

    let find = |wanted: &str| {
        header.iter().position(|h| {
            h.trim_start_matches('\u{feff}').trim().to_lowercase() == wanted.to_lowercase()
        })
    };
    let (desc_col, price_col) = match (find(DESCRIPTION_COLUMN), find(PRICE_COLUMN)) {
        (Some(d), Some(p)) => (d, p),
        (d, p) => {
            let mut missing = Vec::new();
            if d.is_none() {
                missing.push(DESCRIPTION_COLUMN.to_string());
            }
            if p.is_none() {
                missing.push(PRICE_COLUMN.to_string());
            }
            return Err(AppError::MissingColumns(missing));
        }
    };

    let mut items = Vec::with_capacity(body.len());
    for (idx, row) in body.iter().enumerate() {
        let cell = |col: usize| row.get(col).map(|s| s.trim()).unwrap_or("");
        let (description, raw_price) = (cell(desc_col), cell(price_col));

        if description.is_empty() && raw_price.is_empty() {
            continue;
        }

        // 表头为第 1 行
        let price = parse_price(raw_price).ok_or_else(|| AppError::InvalidPrice {
            row: idx + 2,
            value: raw_price.to_string(),
        })?;
        items.push(InputItem::new(description, price));
    }

    Ok(items)
}

/// 售价: 允许 £ 前缀和千位分隔符
fn parse_price(raw: &str) -> Option<BigDecimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(&cleaned).ok()
}
