// ==========================================
// 电商数据集 ETL 管道 - 核心库
// ==========================================
// 数据流向: 远端压缩包 -> 本地缓存 -> 内存表 -> sink 表
// 运行模型: 单操作者一次性批处理，严格串行
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 内存表
pub mod domain;

// 配置层 - 环境配置
pub mod config;

// 采集层 - 数据集缓存与解析
pub mod extract;

// Sink 层 - 装载目标
pub mod sink;

// 管道层 - 编排
pub mod pipeline;

// 统一错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{PipelineConfig, SinkKind};
pub use domain::table::{Column, ColumnType, DataTable, TableCollection};
pub use error::{ErrorKind, EtlError, EtlResult};
pub use extract::{acquire, clean_table_name, DatasetHub, KaggleHub};
pub use pipeline::{PipelineDriver, PipelineReport};
pub use sink::{RelationalSink, Sink, WarehouseSink};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "电商数据集 ETL 管道";

// 固定的数据集标识
pub const DATASET_SLUG: &str = "olistbr/brazilian-ecommerce";

// 目标容器名（schema / dataset）
pub const CONTAINER_NAME: &str = "raw_olist";
