use chrono::Utc;

use crate::models::{CommitOutcome, ExportRow, InputItem, LineItem, MatchSummary, ReconcileOutcome};
use crate::store::ReferenceStore;

/// 批量对账服务: 订单行 -> SKU 参考库精确匹配 -> 人工补全 -> 回写参考库 + DHL 导出
pub struct BatchReconciler<S> {
    store: S,
}

impl<S: ReferenceStore> BatchReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 匹配一批订单行, 输出与输入同序同长
    pub fn reconcile(&self, items: &[InputItem]) -> ReconcileOutcome {
        let descriptions: Vec<&str> = items.iter().map(|i| i.description.trim()).collect();
        let hits = self.store.lookup_batch(&descriptions);

        let line_items: Vec<LineItem> = items
            .iter()
            .zip(descriptions)
            .zip(hits)
            .map(|((input, desc), hit)| {
                let mut item = LineItem::unmatched(desc, input.selling_price.clone());
                match hit {
                    Some(rec) => {
                        tracing::debug!("Exact match: '{}' -> {}", desc, rec.commodity_code());
                        item.commodity_code = Some(rec.commodity_code().to_string());
                        item.weight = Some(rec.weight().to_string());
                        item.origin_country = Some(rec.origin_country().to_string());
                        item.matched = true;
                    }
                    None => tracing::debug!("No match for '{}'", desc),
                }
                item
            })
            .collect();

        let summary = MatchSummary::from_items(&line_items);
        tracing::info!(
            "匹配完成: 总计: {}, 找到: {}, 未找到: {}",
            summary.total,
            summary.matched,
            summary.unmatched
        );
        if summary.unmatched > 0 {
            tracing::warn!("{} item(s) need manual completion", summary.unmatched);
        }

        ReconcileOutcome {
            items: line_items,
            summary,
        }
    }

    /// 提交编辑后的商品行: 勾选回写且字段完整的行追加到参考库, 每行都生成导出行
    pub fn commit(&self, edited: &[LineItem]) -> CommitOutcome {
        let mut new_records = Vec::new();

        for item in edited.iter().filter(|i| i.write_back) {
            if !item.is_complete() {
                tracing::info!(
                    "'{}' flagged for write-back but incomplete, skipping",
                    item.description
                );
                continue;
            }
            let appended = self.store.append(
                &item.description,
                or_blank(&item.commodity_code),
                or_blank(&item.weight),
                or_blank(&item.origin_country),
            );
            match appended {
                Ok(Some(rec)) => new_records.push(rec),
                Ok(None) => tracing::info!("Write-back without description skipped"),
                // 参考库写入失败不影响导出
                Err(e) => tracing::warn!(
                    "Failed to write '{}' to reference store: {}",
                    item.description,
                    e
                ),
            }
        }

        let export_rows: Vec<ExportRow> = edited.iter().map(ExportRow::from_line_item).collect();

        tracing::info!(
            "Commit finished: {} export rows, {} new reference records",
            export_rows.len(),
            new_records.len()
        );

        CommitOutcome {
            committed_at: Utc::now(),
            new_records,
            export_rows,
        }
    }
}

fn or_blank(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or_default()
}
