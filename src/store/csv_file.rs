use indexmap::IndexMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::ReferenceStore;
use crate::error::AppError;
use crate::models::{normalize_key, ReferenceRecord, STORE_HEADER};

/// CSV 文件参考库 (sku_reference_data.csv)
///
/// 每次查找都重新读取文件, 外部对文件的替换或删除立即生效。
/// 文件缺失、损坏或表头不全时按空库处理。
///
/// 追加和清空在同一进程内 (含各个 clone) 串行执行; 不对其他进程加锁,
/// 一个文件只应由一个服务进程写入。
#[derive(Debug, Clone)]
pub struct CsvReferenceStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvReferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 清空参考库 (删除文件)。文件不存在时视为成功
    pub fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Reference store {} cleared", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取全部完整记录 (存储顺序); 任何读取错误都降级为空列表
    fn load_rows(&self) -> Vec<ReferenceRecord> {
        match self.try_load_rows() {
            Ok(rows) => rows,
            Err(AppError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Reference store {} not created yet", self.path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Reference store {} unreadable, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn try_load_rows(&self) -> Result<Vec<ReferenceRecord>, AppError> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader.byte_headers()?.clone();
        let columns = locate_columns(&headers)?;

        // 按字节读取: 手工编辑 (如 Latin-1 另存) 的行不会让整个文件作废
        let mut rows = Vec::new();
        for (idx, result) in reader.byte_records().enumerate() {
            let record = result?;
            if std::str::from_utf8(record.as_slice()).is_err() {
                tracing::warn!(
                    "Reference store row {} is not valid UTF-8, decoding lossily",
                    idx + 2
                );
            }
            let field = |col: usize| String::from_utf8_lossy(record.get(col).unwrap_or(b""));
            let [desc, code, weight, origin] = columns.map(field);

            match ReferenceRecord::new(&desc, &code, &weight, &origin) {
                Some(rec) => rows.push(rec),
                None => tracing::warn!(
                    "Reference store row {} is incomplete, skipping: [{}, {}, {}, {}]",
                    idx + 2,
                    desc,
                    code,
                    weight,
                    origin
                ),
            }
        }
        Ok(rows)
    }

    /// 按描述键建立索引, 重复键保留第一条
    fn load_index(&self) -> IndexMap<String, ReferenceRecord> {
        let mut index = IndexMap::new();
        for rec in self.load_rows() {
            index.entry(rec.description_key()).or_insert(rec);
        }
        index
    }
}

/// 按表头名 (忽略大小写) 定位四列
fn locate_columns(headers: &csv::ByteRecord) -> Result<[usize; 4], AppError> {
    let names: Vec<String> = headers
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_lowercase()
        })
        .collect();

    let mut columns = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, wanted) in columns.iter_mut().zip(STORE_HEADER) {
        match names.iter().position(|n| *n == wanted.to_lowercase()) {
            Some(pos) => *slot = pos,
            None => missing.push(wanted.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(columns)
    } else {
        Err(AppError::MissingColumns(missing))
    }
}

/// 把一行编码成完整的 CSV 行 (含换行)
fn encode_line(fields: &[&str]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

/// 已有文件末尾是否缺少换行 (手工编辑过的文件)
fn missing_trailing_newline(file: &mut File) -> Result<bool, AppError> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl ReferenceStore for CsvReferenceStore {
    fn lookup(&self, description: &str) -> Option<ReferenceRecord> {
        let key = normalize_key(description);
        self.load_rows()
            .into_iter()
            .find(|r| r.description_key() == key)
    }

    /// 整批只读取一次文件
    fn lookup_batch(&self, descriptions: &[&str]) -> Vec<Option<ReferenceRecord>> {
        let index = self.load_index();
        tracing::debug!(
            "Reference store loaded: {} distinct descriptions",
            index.len()
        );
        descriptions
            .iter()
            .map(|d| index.get(&normalize_key(d)).cloned())
            .collect()
    }

    fn append_record(&self, record: &ReferenceRecord) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // 长度检查到写入完成之间持锁, 保证表头只写一次
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut buf = Vec::new();
        if file.metadata()?.len() == 0 {
            buf.extend(encode_line(&STORE_HEADER)?);
            tracing::info!("Reference store {} created", self.path.display());
        } else if missing_trailing_newline(&mut file)? {
            buf.push(b'\n');
        }
        buf.extend(encode_line(&record.to_fields())?);

        // 单次写入整行
        file.write_all(&buf)?;
        file.flush()?;

        tracing::info!(
            "Appended '{}' -> {} to reference store",
            record.description(),
            record.commodity_code()
        );
        Ok(())
    }

    fn records(&self) -> Vec<ReferenceRecord> {
        self.load_rows()
    }
}

/// 参考库格式的 CSV 文本 (带表头), 用于下载本次新增记录
pub fn render_records_csv(records: &[ReferenceRecord]) -> Result<String, AppError> {
    let mut buf = encode_line(&STORE_HEADER)?;
    for rec in records {
        buf.extend(encode_line(&rec.to_fields())?);
    }
    String::from_utf8(buf).map_err(|e| AppError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))
}
