// ==========================================
// 电商数据集 ETL 管道 - Sink 层
// ==========================================
// 职责: 统一的装载能力抽象（容器生命周期 + 全量替换装载）
// 实现者: RelationalSink (PostgreSQL) / WarehouseSink (BigQuery)
// ==========================================

pub mod bigquery;
pub mod relational;
pub mod warehouse;

pub use bigquery::BigQueryRest;
pub use relational::{PgConn, RelationalConn, RelationalSink};
pub use warehouse::{LoadJobSpec, WarehouseClient, WarehouseSink};

use crate::domain::table::DataTable;
use crate::error::EtlResult;

// ==========================================
// Sink Trait - 装载能力
// ==========================================
// 用途: 管道驱动器唯一依赖的多态接口，启动时按配置选定一个实现
pub trait Sink {
    /// sink 标识（日志用）
    fn kind(&self) -> &'static str;

    /// 幂等地确保目标容器（schema / dataset）存在
    ///
    /// 先探测存在性，缺失才创建；第二次调用必须是空操作。
    /// 探测阶段除"未找到"之外的任何失败都向上传播。
    fn ensure_container(&mut self, container: &str) -> EtlResult<()>;

    /// 全量替换装载单张表
    ///
    /// 目标表既有内容（关系型 sink 还包括列定义）全部丢弃，
    /// 列从内存表自动推导。调用同步阻塞直至 sink 确认写入完成。
    /// 任何失败都带表名与容器上下文记录日志后重新抛出，不重试。
    fn load_table(&mut self, container: &str, table_name: &str, table: &DataTable)
        -> EtlResult<()>;
}
