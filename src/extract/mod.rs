// ==========================================
// 电商数据集 ETL 管道 - 数据采集层
// ==========================================
// 职责: 幂等的本地数据集缓存（冷启动下载 / 热启动复用）
//       + 文件名到表名的规范化 + CSV 到内存表的物化
// ==========================================

pub mod kaggle;

pub use kaggle::KaggleHub;

use crate::domain::table::{DataTable, TableCollection};
use crate::error::{EtlError, EtlResult};
use csv::ReaderBuilder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 源文件名中的数据源前缀记号
pub const SOURCE_PREFIX: &str = "olist_";

/// 源文件名中的通用后缀记号
pub const GENERIC_SUFFIX: &str = "_dataset";

// ==========================================
// DatasetHub Trait - 数据集平台客户端
// ==========================================
// 用途: 下载数据集压缩包并解包到指定目录
// 实现者: KaggleHub（生产）、测试替身
pub trait DatasetHub {
    /// 下载数据集并就地解包
    ///
    /// # 参数
    /// - dataset_slug: 数据集标识（如 `olistbr/brazilian-ecommerce`）
    /// - dest: 解包目标目录（已存在）
    fn download_and_unzip(&self, dataset_slug: &str, dest: &Path) -> EtlResult<()>;
}

// ==========================================
// 表名规范化
// ==========================================

/// 将源文件名规范化为表名
///
/// 处理顺序固定: 去掉末尾 `.csv` 扩展名，删除所有数据源前缀记号，
/// 删除所有通用后缀记号。纯函数，永不失败；输入退化时可能返回空串。
///
/// # 示例
/// `olist_orders_dataset.csv` -> `orders`
pub fn clean_table_name(file_name: &str) -> String {
    let name = file_name.strip_suffix(".csv").unwrap_or(file_name);
    name.replace(SOURCE_PREFIX, "").replace(GENERIC_SUFFIX, "")
}

// ==========================================
// 本地数据集缓存
// ==========================================

/// 获取数据集并物化为内存表集合（幂等 get-or-create）
///
/// 策略:
/// 1. 展开用户目录、绝对化缓存路径
/// 2. 目录不存在或为空 => 冷缓存: 建目录并调用一次下载
/// 3. 目录非空 => 热缓存: 跳过下载（仅以文件存在性判定，不校验新鲜度）
/// 4. 非递归扫描 `.csv` 文件，逐个解析入集合
///
/// 注意: 只含非 CSV 文件的目录同样视为热缓存，结果为空集合。
///
/// # 参数
/// - hub: 数据集平台客户端
/// - dataset_slug: 数据集标识
/// - save_path: 缓存目录（可为相对或 `~` 开头路径）
pub fn acquire(
    hub: &dyn DatasetHub,
    dataset_slug: &str,
    save_path: &str,
) -> EtlResult<TableCollection> {
    let dir = resolve_save_path(save_path)?;

    let cold = !dir.is_dir() || fs::read_dir(&dir)?.next().is_none();
    if cold {
        info!(dataset = dataset_slug, dir = %dir.display(), "冷缓存，开始下载数据集");
        fs::create_dir_all(&dir)?;
        hub.download_and_unzip(dataset_slug, &dir)?;
    } else {
        info!(dir = %dir.display(), "热缓存，复用本地数据");
    }

    load_tables_from_dir(&dir)
}

/// 展开 `~` 并绝对化缓存路径
fn resolve_save_path(save_path: &str) -> EtlResult<PathBuf> {
    let expanded = if save_path == "~" {
        home_dir()?
    } else if let Some(rest) = save_path.strip_prefix("~/") {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(save_path)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

fn home_dir() -> EtlResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| EtlError::Internal("无法确定用户主目录".to_string()))
}

/// 扫描目录中的 CSV 文件并解析为表集合
///
/// 同名冲突时后写者胜出（BTreeMap insert 语义）。
fn load_tables_from_dir(dir: &Path) -> EtlResult<TableCollection> {
    let mut tables = TableCollection::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.ends_with(".csv") {
            continue;
        }

        let table_name = clean_table_name(&file_name);
        let table = read_csv_table(&entry.path())?;
        debug!(
            file = %file_name,
            table = %table_name,
            rows = table.num_rows(),
            "CSV 解析完成"
        );
        tables.insert(table_name, table);
    }

    Ok(tables)
}

/// 解析单个 CSV 文件为内存表
///
/// 首行为表头；单元格两端空白去除；完全空白的行跳过；
/// 行长度与表头不一致时按表头截断/补空。
fn read_csv_table(path: &Path) -> EtlResult<DataTable> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).map(str::trim).unwrap_or("").to_string());
        }

        // 跳过完全空白的行
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(DataTable::from_rows(headers, rows))
}
