use serde::Serialize;

/// 参考库列名 (固定顺序)
pub const STORE_HEADER: [&str; 4] = [
    "Item Description",
    "Commodity Code",
    "Weight",
    "Origin Country",
];

/// 商品描述归一化: 去首尾空白并转小写, 作为参考库查找键
pub fn normalize_key(description: &str) -> String {
    description.trim().to_lowercase()
}

/// SKU 参考记录 (ReferenceRecord)
///
/// 只能通过 [`ReferenceRecord::new`] 构造, 四个字段必须全部非空,
/// 因此参考库中不存在残缺记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    description: String,
    commodity_code: String,
    weight: String,
    origin_country: String,
}

impl ReferenceRecord {
    /// 任一字段为空 (含纯空白) 时返回 None
    pub fn new(
        description: &str,
        commodity_code: &str,
        weight: &str,
        origin_country: &str,
    ) -> Option<Self> {
        let fields = [description, commodity_code, weight, origin_country].map(str::trim);
        if fields.iter().any(|f| f.is_empty()) {
            return None;
        }
        let [description, commodity_code, weight, origin_country] = fields.map(str::to_string);
        Some(Self {
            description,
            commodity_code,
            weight,
            origin_country,
        })
    }

    /// 录入时的商品描述 (已去首尾空白, 保留大小写)
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 查找键
    pub fn description_key(&self) -> String {
        normalize_key(&self.description)
    }

    pub fn commodity_code(&self) -> &str {
        &self.commodity_code
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn origin_country(&self) -> &str {
        &self.origin_country
    }

    /// 按参考库列顺序输出
    pub fn to_fields(&self) -> [&str; 4] {
        [
            &self.description,
            &self.commodity_code,
            &self.weight,
            &self.origin_country,
        ]
    }
}
