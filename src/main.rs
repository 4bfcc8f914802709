// ==========================================
// 电商数据集 ETL 管道 - 主入口
// ==========================================
// 无命令行参数：数据集与容器名为编译期常量，
// 其余配置来自环境变量。全量成功退出码 0，任何致命错误非 0。
// ==========================================

use olist_etl::sink::Sink;
use olist_etl::{
    logging, EtlResult, KaggleHub, PipelineConfig, PipelineDriver, RelationalSink, SinkKind,
    WarehouseSink, CONTAINER_NAME, DATASET_SLUG,
};

fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", olist_etl::APP_NAME);
    tracing::info!("系统版本: {}", olist_etl::VERSION);
    tracing::info!("==================================================");

    if let Err(e) = run() {
        tracing::error!(error = %e, "管道致命错误");
        std::process::exit(1);
    }
}

fn run() -> EtlResult<()> {
    // 配置装配与快速失败校验（任何网络 I/O 之前）
    let config = PipelineConfig::from_env()?;
    config.validate()?;

    let hub = KaggleHub::new(&config.hub)?;

    // 认证目标 sink（每次运行恰好一个）
    let mut sink: Box<dyn Sink> = match config.sink {
        SinkKind::Relational => {
            tracing::info!("正在连接 PostgreSQL...");
            Box::new(RelationalSink::connect(&config.relational.resolve()?)?)
        }
        SinkKind::Warehouse => {
            tracing::info!("正在初始化 BigQuery 客户端...");
            Box::new(WarehouseSink::connect(&config.warehouse)?)
        }
    };

    let mut driver = PipelineDriver::new(&hub, sink.as_mut());
    let report = driver.run(DATASET_SLUG, &config.data_dir, CONTAINER_NAME)?;

    tracing::info!(
        tables = report.tables.len(),
        total_rows = report.total_rows(),
        "管道执行成功"
    );
    Ok(())
}
