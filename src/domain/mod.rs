// ==========================================
// 电商数据集 ETL 管道 - 领域层
// ==========================================
// 职责: 内存表及其列类型表示
// ==========================================

pub mod table;

pub use table::{Column, ColumnType, DataTable, TableCollection};
