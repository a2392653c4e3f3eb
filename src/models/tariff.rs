use serde::{Deserialize, Serialize};

/// UK Trade Tariff 候选商品编码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffCandidate {
    pub commodity_code: String,
    pub description: String,
    pub official_link: String,
}
