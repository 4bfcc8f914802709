// ==========================================
// 电商数据集 ETL 管道 - 云数仓 Sink
// ==========================================
// 职责: dataset 幂等创建（固定地域）+ 截断式装载作业
//       提交后阻塞等待作业终态，再回读表元数据记录行数
// ==========================================

use crate::config::WarehouseConfig;
use crate::domain::table::DataTable;
use crate::error::{EtlError, EtlResult};
use crate::sink::bigquery::BigQueryRest;
use crate::sink::Sink;
use tracing::{debug, error, info};

/// 新建 dataset 固定使用的地域
pub const WAREHOUSE_LOCATION: &str = "US";

// ==========================================
// LoadJobSpec - 装载作业参数
// ==========================================

/// 装载作业参数（sink 策略的显式形态）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobSpec {
    pub dataset: String,
    pub table: String,
    /// 全量替换: 既有内容被截断重写
    pub write_truncate: bool,
    /// 目标表结构由仓库自动探测
    pub autodetect: bool,
    /// CSV 载荷携带的表头行数
    pub skip_leading_rows: u32,
}

// ==========================================
// WarehouseClient Trait - 仓库客户端接口
// ==========================================
// 用途: sink 所需的最小仓库能力（vendor SDK 的消费面）
// 实现者: BigQueryRest（生产）、测试替身
pub trait WarehouseClient {
    /// 凭据所属项目
    fn project_id(&self) -> &str;

    /// 探测 dataset 是否存在；"未找到"不是错误
    fn dataset_exists(&mut self, dataset: &str) -> EtlResult<bool>;

    /// 创建 dataset
    fn create_dataset(&mut self, dataset: &str, location: &str) -> EtlResult<()>;

    /// 提交装载作业（CSV 载荷），返回作业 ID
    fn insert_load_job(&mut self, spec: &LoadJobSpec, payload: &[u8]) -> EtlResult<String>;

    /// 阻塞直到作业到达终态；作业失败即返回错误
    fn wait_for_job(&mut self, job_id: &str) -> EtlResult<()>;

    /// 读取表元数据中的行数
    fn table_num_rows(&mut self, dataset: &str, table: &str) -> EtlResult<u64>;
}

// ==========================================
// WarehouseSink
// ==========================================

pub struct WarehouseSink<C: WarehouseClient> {
    client: C,
}

impl WarehouseSink<BigQueryRest> {
    /// 认证并构造 sink（读取密钥文件、换取访问令牌）
    pub fn connect(config: &WarehouseConfig) -> EtlResult<Self> {
        Ok(Self::new(BigQueryRest::connect(config)?))
    }
}

impl<C: WarehouseClient> WarehouseSink<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// 访问底层客户端（测试断言用）
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: WarehouseClient> Sink for WarehouseSink<C> {
    fn kind(&self) -> &'static str {
        "bigquery"
    }

    fn ensure_container(&mut self, container: &str) -> EtlResult<()> {
        let exists = self
            .client
            .dataset_exists(container)
            .map_err(|e| EtlError::Container {
                container: container.to_string(),
                message: e.to_string(),
            })?;

        if exists {
            info!(dataset = container, "dataset 已存在");
        } else {
            self.client
                .create_dataset(container, WAREHOUSE_LOCATION)
                .map_err(|e| EtlError::Container {
                    container: container.to_string(),
                    message: e.to_string(),
                })?;
            info!(
                dataset = container,
                location = WAREHOUSE_LOCATION,
                "dataset 创建成功"
            );
        }
        Ok(())
    }

    fn load_table(
        &mut self,
        container: &str,
        table_name: &str,
        table: &DataTable,
    ) -> EtlResult<()> {
        let table_id = format!("{}.{}.{}", self.client.project_id(), container, table_name);

        let result = (|| -> EtlResult<u64> {
            // 载荷携带表头，供仓库自动探测列结构；行下标不在其中
            let payload = table.to_csv(true)?;
            let spec = LoadJobSpec {
                dataset: container.to_string(),
                table: table_name.to_string(),
                write_truncate: true,
                autodetect: true,
                skip_leading_rows: 1,
            };

            let job_id = self.client.insert_load_job(&spec, &payload)?;
            debug!(table = table_name, job_id = %job_id, "装载作业已提交");
            self.client.wait_for_job(&job_id)?;

            // 回读元数据，记录目的端行数
            self.client.table_num_rows(container, table_name)
        })();

        match result {
            Ok(rows) => {
                info!(table_id = %table_id, rows, "表装载成功");
                Ok(())
            }
            Err(e) => {
                error!(table = table_name, dataset = container, error = %e, "表装载失败");
                Err(EtlError::TableLoad {
                    table: table_name.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
