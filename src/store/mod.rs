pub mod csv_file;
pub mod memory;

pub use csv_file::CsvReferenceStore;
pub use memory::MemoryReferenceStore;

use crate::error::AppError;
use crate::models::ReferenceRecord;

/// SKU 参考库接口
///
/// 精确匹配 (去空白 + 忽略大小写), 只追加不修改。重复描述允许存在,
/// 查找时按存储顺序返回第一条。读取失败一律视为空库。
pub trait ReferenceStore: Send + Sync {
    /// 按商品描述查找
    fn lookup(&self, description: &str) -> Option<ReferenceRecord>;

    /// 批量查找, 结果与输入同序
    fn lookup_batch(&self, descriptions: &[&str]) -> Vec<Option<ReferenceRecord>> {
        descriptions.iter().map(|d| self.lookup(d)).collect()
    }

    /// 追加一条完整记录
    fn append_record(&self, record: &ReferenceRecord) -> Result<(), AppError>;

    /// 全部记录 (存储顺序)
    fn records(&self) -> Vec<ReferenceRecord>;

    /// 追加; 任一字段为空时不写入并返回 `Ok(None)`
    fn append(
        &self,
        description: &str,
        commodity_code: &str,
        weight: &str,
        origin_country: &str,
    ) -> Result<Option<ReferenceRecord>, AppError> {
        let Some(record) = ReferenceRecord::new(description, commodity_code, weight, origin_country)
        else {
            tracing::debug!("Incomplete record for '{}' rejected", description.trim());
            return Ok(None);
        };
        self.append_record(&record)?;
        Ok(Some(record))
    }
}
