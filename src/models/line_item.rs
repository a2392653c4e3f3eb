use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 订单输入行: 上传解析后只保留商品描述和售价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    pub description: String,
    #[serde(deserialize_with = "price_text::deserialize")]
    pub selling_price: BigDecimal,
}

impl InputItem {
    pub fn new(description: impl Into<String>, selling_price: BigDecimal) -> Self {
        Self {
            description: description.into(),
            selling_price,
        }
    }
}

/// 可编辑商品行 (LineItem)
///
/// 内部用 `None` 表示未知字段; 序列化时统一输出空字符串,
/// 反序列化时空字符串 (含纯空白) 还原为 `None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(deserialize_with = "price_text::deserialize")]
    pub selling_price: BigDecimal,
    #[serde(default, with = "blank_as_none")]
    pub commodity_code: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub weight: Option<String>,
    #[serde(default, with = "blank_as_none")]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub matched: bool,
    /// 用户勾选: 写入 SKU 参考库
    #[serde(default)]
    pub write_back: bool,
}

impl LineItem {
    /// 未匹配行, 三个海关字段留空待人工补全
    pub fn unmatched(description: impl Into<String>, selling_price: BigDecimal) -> Self {
        Self {
            description: description.into(),
            selling_price,
            commodity_code: None,
            weight: None,
            origin_country: None,
            matched: false,
            write_back: false,
        }
    }

    /// 三个海关字段是否都已填写
    pub fn is_complete(&self) -> bool {
        [&self.commodity_code, &self.weight, &self.origin_country]
            .iter()
            .all(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// 匹配统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub total: usize,
    /// 整批申报总价值 (售价合计)
    pub total_declared_value: BigDecimal,
}

impl MatchSummary {
    pub fn from_items(items: &[LineItem]) -> Self {
        let matched = items.iter().filter(|i| i.matched).count();
        let total_declared_value = items
            .iter()
            .fold(BigDecimal::zero(), |acc, i| acc + &i.selling_price);
        Self {
            matched,
            unmatched: items.len() - matched,
            total: items.len(),
            total_declared_value,
        }
    }
}

/// reconcile 结果: 与输入同序同长的商品行 + 统计
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub items: Vec<LineItem>,
    pub summary: MatchSummary,
}

/// 售价按原始文本解析, JSON 数字不经过 f64 转换 (800.5 -> "800.5")
pub(crate) mod price_text {
    use bigdecimal::BigDecimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => n.to_string(),
            RawPrice::Text(s) => s.trim().to_string(),
        };
        BigDecimal::from_str(&text)
            .map_err(|_| D::Error::custom(format!("invalid selling price '{text}'")))
    }
}

/// `Option<String>` <-> 空字符串
pub(crate) mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}
