// ==========================================
// 电商数据集 ETL 管道 - 关系型 Sink (PostgreSQL)
// ==========================================
// 职责: schema 幂等创建 + drop/create/COPY 式全量替换装载
// 连接: connect-by-URL，同步客户端，构造即校验连通性
// ==========================================

use crate::config::RelationalConfig;
use crate::domain::table::DataTable;
use crate::error::{EtlError, EtlResult};
use crate::sink::Sink;
use std::io::Write;
use tracing::{debug, error, info};

// ==========================================
// RelationalConn Trait - 数据库客户端接口
// ==========================================
// 用途: sink 所需的最小数据库能力（DDL + 批量写入）
// 实现者: PgConn（生产）、测试替身
pub trait RelationalConn {
    /// 执行单条语句，返回受影响行数
    fn execute(&mut self, sql: &str) -> EtlResult<u64>;

    /// 执行查询并取第一行第一列（无结果返回 None）
    fn query_scalar(&mut self, sql: &str) -> EtlResult<Option<String>>;

    /// COPY 批量写入，返回写入行数
    fn copy_in(&mut self, sql: &str, data: &[u8]) -> EtlResult<u64>;
}

// ==========================================
// PgConn - postgres 客户端封装
// ==========================================

pub struct PgConn {
    client: postgres::Client,
}

impl PgConn {
    /// 按 URL 建立连接（连接失败即认证阶段致命错误）
    pub fn connect(config: &RelationalConfig) -> EtlResult<Self> {
        let client = postgres::Client::connect(&config.url(), postgres::NoTls)
            .map_err(|e| EtlError::DatabaseConnection(e.to_string()))?;
        Ok(Self { client })
    }
}

impl RelationalConn for PgConn {
    fn execute(&mut self, sql: &str) -> EtlResult<u64> {
        Ok(self.client.execute(sql, &[])?)
    }

    fn query_scalar(&mut self, sql: &str) -> EtlResult<Option<String>> {
        let row = self.client.query_opt(sql, &[])?;
        match row {
            Some(row) => {
                let value: String = row
                    .try_get(0)
                    .map_err(|e| EtlError::SqlExecution(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn copy_in(&mut self, sql: &str, data: &[u8]) -> EtlResult<u64> {
        let mut writer = self.client.copy_in(sql)?;
        writer
            .write_all(data)
            .map_err(|e| EtlError::SqlExecution(format!("COPY 写入失败: {}", e)))?;
        Ok(writer.finish()?)
    }
}

// ==========================================
// RelationalSink
// ==========================================

pub struct RelationalSink<C: RelationalConn> {
    conn: C,
}

impl RelationalSink<PgConn> {
    /// 连接并构造 sink（认证步骤）
    pub fn connect(config: &RelationalConfig) -> EtlResult<Self> {
        Ok(Self::new(PgConn::connect(config)?))
    }
}

impl<C: RelationalConn> RelationalSink<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// 访问底层连接（测试断言用）
    pub fn conn(&self) -> &C {
        &self.conn
    }

    /// 生成建表语句（列与类型来自内存表）
    fn create_table_sql(qualified: &str, table: &DataTable) -> String {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.ty.postgres_type()))
            .collect();
        format!("CREATE TABLE {} ({})", qualified, columns.join(", "))
    }
}

impl<C: RelationalConn> Sink for RelationalSink<C> {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    fn ensure_container(&mut self, container: &str) -> EtlResult<()> {
        let probe = format!(
            "SELECT schema_name::text FROM information_schema.schemata WHERE schema_name = {}",
            quote_literal(container)
        );
        let found = self
            .conn
            .query_scalar(&probe)
            .map_err(|e| EtlError::Container {
                container: container.to_string(),
                message: e.to_string(),
            })?;

        match found {
            Some(_) => {
                info!(schema = container, "schema 已存在");
            }
            None => {
                self.conn
                    .execute(&format!("CREATE SCHEMA {}", quote_ident(container)))
                    .map_err(|e| EtlError::Container {
                        container: container.to_string(),
                        message: e.to_string(),
                    })?;
                info!(schema = container, "schema 创建成功");
            }
        }
        Ok(())
    }

    fn load_table(
        &mut self,
        container: &str,
        table_name: &str,
        table: &DataTable,
    ) -> EtlResult<()> {
        let result = (|| -> EtlResult<u64> {
            if table.num_columns() == 0 {
                return Err(EtlError::SqlExecution("表没有任何列".to_string()));
            }

            let qualified = format!("{}.{}", quote_ident(container), quote_ident(table_name));

            // 全量替换: 旧表连同列定义一并丢弃
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", qualified))?;
            self.conn
                .execute(&Self::create_table_sql(&qualified, table))?;

            // 行下标不落库，载荷只含列数据
            let payload = table.to_csv(false)?;
            let copy = format!("COPY {} FROM STDIN WITH (FORMAT csv)", qualified);
            self.conn.copy_in(&copy, &payload)
        })();

        match result {
            Ok(rows) => {
                debug!(table = table_name, schema = container, rows, "表装载完成");
                Ok(())
            }
            Err(e) => {
                error!(table = table_name, schema = container, error = %e, "表装载失败");
                Err(EtlError::TableLoad {
                    table: table_name.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// 标识符转义（双引号包裹）
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 字符串字面量转义（单引号包裹）
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
