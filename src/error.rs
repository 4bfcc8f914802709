// ==========================================
// 电商数据集 ETL 管道 - 统一错误类型
// ==========================================
// 工具: thiserror 派生宏
// 职责: 按失败类别（配置/连接/采集/装载）划分错误，
//       调用方可通过 kind() 程序化区分，而非解析消息文本
// ==========================================

use thiserror::Error;

/// 管道错误类型
#[derive(Error, Debug)]
pub enum EtlError {
    // ===== 配置错误 =====
    #[error("配置缺失: {0}")]
    MissingConfig(String),

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidConfig { key: String, message: String },

    // ===== 连接错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnection(String),

    #[error("仓库认证失败: {0}")]
    WarehouseAuth(String),

    // ===== 采集错误 =====
    #[error("数据集下载失败: {0}")]
    Download(String),

    #[error("压缩包解包失败: {0}")]
    Unzip(String),

    #[error("缓存目录访问失败: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    CsvParse(#[from] csv::Error),

    // ===== 装载错误 =====
    #[error("容器操作失败 (container: {container}): {message}")]
    Container { container: String, message: String },

    #[error("表装载失败 (table: {table}): {message}")]
    TableLoad { table: String, message: String },

    #[error("数据库语句执行失败: {0}")]
    SqlExecution(String),

    #[error("仓库请求失败: {0}")]
    WarehouseApi(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 错误类别（失败分类学的程序化视图）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 配置错误：在任何网络 I/O 之前报告
    Config,
    /// 连接错误：sink 不可达 / 认证被拒
    Connectivity,
    /// 采集错误：下载、解包、CSV 读取失败
    Acquisition,
    /// 装载错误：容器或单表写入失败
    Load,
    /// 其他内部错误
    Internal,
}

impl EtlError {
    /// 返回错误所属类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::MissingConfig(_) | EtlError::InvalidConfig { .. } => ErrorKind::Config,
            EtlError::DatabaseConnection(_) | EtlError::WarehouseAuth(_) => ErrorKind::Connectivity,
            EtlError::Download(_)
            | EtlError::Unzip(_)
            | EtlError::CacheIo(_)
            | EtlError::CsvParse(_) => ErrorKind::Acquisition,
            EtlError::Container { .. }
            | EtlError::TableLoad { .. }
            | EtlError::SqlExecution(_)
            | EtlError::WarehouseApi(_) => ErrorKind::Load,
            EtlError::Internal(_) | EtlError::Other(_) => ErrorKind::Internal,
        }
    }
}

// 实现 From<postgres::Error>
// 连接阶段的错误需要区分为 DatabaseConnection，由调用处显式映射
impl From<postgres::Error> for EtlError {
    fn from(err: postgres::Error) -> Self {
        EtlError::SqlExecution(err.to_string())
    }
}

// 实现 From<zip::result::ZipError>
impl From<zip::result::ZipError> for EtlError {
    fn from(err: zip::result::ZipError) -> Self {
        EtlError::Unzip(err.to_string())
    }
}

/// Result 类型别名
pub type EtlResult<T> = Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            EtlError::MissingConfig("POSTGRES_USER".to_string()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            EtlError::DatabaseConnection("refused".to_string()).kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(
            EtlError::Download("404".to_string()).kind(),
            ErrorKind::Acquisition
        );
        assert_eq!(
            EtlError::TableLoad {
                table: "orders".to_string(),
                message: "quota".to_string(),
            }
            .kind(),
            ErrorKind::Load
        );
    }

    #[test]
    fn test_error_message_carries_context() {
        let err = EtlError::Container {
            container: "raw_olist".to_string(),
            message: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("raw_olist"));
        assert!(msg.contains("permission denied"));
    }
}
