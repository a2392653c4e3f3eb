pub mod export;
pub mod line_item;
pub mod record;
pub mod tariff;

pub use export::{
    format_commodity_code, render_export_csv, CommitOutcome, ExportRow, EXPORT_COLUMNS,
    EXPORT_FILE_NAME,
};
pub use line_item::{InputItem, LineItem, MatchSummary, ReconcileOutcome};
pub use record::{normalize_key, ReferenceRecord, STORE_HEADER};
pub use tariff::TariffCandidate;
