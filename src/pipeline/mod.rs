// ==========================================
// 电商数据集 ETL 管道 - 管道驱动器
// ==========================================
// 职责: 线性编排 确保容器 -> 采集 -> 逐表装载
// 约束: 严格串行，无重试；任何一步失败立即终止，
//       已装载的表不回滚，后续表不再尝试
// ==========================================

use crate::error::EtlResult;
use crate::extract::{self, DatasetHub};
use crate::sink::Sink;
use tracing::{debug, info};

// ==========================================
// PipelineReport - 运行结果
// ==========================================

/// 单表装载摘要
#[derive(Debug, Clone)]
pub struct TableLoadSummary {
    pub table: String,
    pub rows: usize,
}

/// 管道运行报告
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub tables: Vec<TableLoadSummary>,
}

impl PipelineReport {
    /// 装载的总行数
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

// ==========================================
// PipelineDriver - 管道驱动器
// ==========================================

pub struct PipelineDriver<'a> {
    hub: &'a dyn DatasetHub,
    sink: &'a mut dyn Sink,
}

impl<'a> PipelineDriver<'a> {
    /// 创建驱动器
    ///
    /// # 参数
    /// - hub: 数据集平台客户端
    /// - sink: 已完成认证的目标 sink（每次运行恰好一个）
    pub fn new(hub: &'a dyn DatasetHub, sink: &'a mut dyn Sink) -> Self {
        Self { hub, sink }
    }

    /// 执行完整管道
    ///
    /// # 参数
    /// - dataset_slug: 数据集标识
    /// - save_path: 本地缓存目录
    /// - container: 目标容器名（schema / dataset）
    ///
    /// # 返回
    /// 成功时的逐表装载报告；任何一步失败立即返回错误
    pub fn run(
        &mut self,
        dataset_slug: &str,
        save_path: &str,
        container: &str,
    ) -> EtlResult<PipelineReport> {
        info!(
            sink = self.sink.kind(),
            container,
            dataset = dataset_slug,
            "管道启动"
        );

        // ==========================================
        // 步骤1: 确保目标容器存在
        // ==========================================
        debug!("步骤1: 确保目标容器存在");
        self.sink.ensure_container(container)?;

        // ==========================================
        // 步骤2: 数据采集
        // ==========================================
        debug!("步骤2: 数据采集");
        let tables = extract::acquire(self.hub, dataset_slug, save_path)?;
        info!(table_count = tables.len(), "采集完成");

        // ==========================================
        // 步骤3: 逐表全量替换装载
        // ==========================================
        debug!("步骤3: 逐表装载");
        let mut report = PipelineReport::default();
        for (name, table) in &tables {
            debug!(table = %name, rows = table.num_rows(), "开始装载");
            self.sink.load_table(container, name, table)?;
            report.tables.push(TableLoadSummary {
                table: name.clone(),
                rows: table.num_rows(),
            });
        }

        info!(
            tables = report.tables.len(),
            total_rows = report.total_rows(),
            "管道执行完成"
        );
        Ok(report)
    }
}
