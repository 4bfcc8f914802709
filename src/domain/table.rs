// ==========================================
// 电商数据集 ETL 管道 - 内存表
// ==========================================
// 职责: 有序列 + 行序列的内存表示，列类型在解析期推断
// 约束: 整表驻留内存，不做流式处理
// ==========================================

use crate::error::EtlResult;
use std::collections::BTreeMap;

/// 列类型（模拟 dataframe 读取器的自动探测结果）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    /// PostgreSQL 建表时对应的类型名
    pub fn postgres_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

/// 表列（名称 + 推断类型）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

/// 内存表：有序列集合 + 行序列
///
/// 单元格以字符串存储，空字符串视为 NULL。
/// 行下标只是内存侧产物，任何 sink 都不持久化它。
#[derive(Debug, Clone)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

/// 表集合：规范化表名 -> 内存表
///
/// BTreeMap 保证装载循环的迭代顺序确定。
pub type TableCollection = BTreeMap<String, DataTable>;

impl DataTable {
    /// 从表头和行数据构建内存表，逐列推断类型
    ///
    /// # 参数
    /// - headers: 列名（保持出现顺序）
    /// - rows: 行数据，每行长度必须等于列数
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                ty: infer_column_type(rows.iter().map(|row| row[idx].as_str())),
                name,
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// 序列化为 CSV 字节流（sink 装载载荷）
    ///
    /// # 参数
    /// - with_header: 是否携带表头行（仓库自动探测需要，COPY 不需要）
    pub fn to_csv(&self, with_header: bool) -> EtlResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if with_header {
            writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| crate::error::EtlError::Internal(format!("CSV 序列化失败: {}", e)))
    }
}

/// 推断单列类型
///
/// 空单元格（NULL）不参与判定；整列为空时退化为 Text。
/// 判定顺序: Boolean -> Integer -> Float -> Text
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut saw_value = false;
    let mut all_bool = true;
    let mut all_int = true;
    let mut all_float = true;

    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        saw_value = true;

        if all_bool && !value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false") {
            all_bool = false;
        }
        if all_int && value.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && value.parse::<f64>().is_err() {
            all_float = false;
        }
        if !all_bool && !all_int && !all_float {
            return ColumnType::Text;
        }
    }

    if !saw_value {
        return ColumnType::Text;
    }
    if all_bool {
        ColumnType::Boolean
    } else if all_int {
        ColumnType::Integer
    } else if all_float {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_infer_integer_column() {
        assert_eq!(
            infer_column_type(["1", "42", "-7"].into_iter()),
            ColumnType::Integer
        );
    }

    #[test]
    fn test_infer_float_column_mixed_with_integers() {
        assert_eq!(
            infer_column_type(["1", "2.5", "3"].into_iter()),
            ColumnType::Float
        );
    }

    #[test]
    fn test_infer_boolean_column_case_insensitive() {
        assert_eq!(
            infer_column_type(["true", "False", "TRUE"].into_iter()),
            ColumnType::Boolean
        );
    }

    #[test]
    fn test_infer_text_column() {
        assert_eq!(
            infer_column_type(["sp", "rj", "12ab"].into_iter()),
            ColumnType::Text
        );
    }

    #[test]
    fn test_nulls_do_not_break_inference() {
        assert_eq!(
            infer_column_type(["", "3", ""].into_iter()),
            ColumnType::Integer
        );
        assert_eq!(infer_column_type(["", ""].into_iter()), ColumnType::Text);
    }

    #[test]
    fn test_from_rows_keeps_column_order() {
        let table = table_of(
            &["order_id", "price", "approved"],
            &[&["o1", "12.9", "true"], &["o2", "3", "false"]],
        );
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["order_id", "price", "approved"]);
        assert_eq!(table.columns()[0].ty, ColumnType::Text);
        assert_eq!(table.columns()[1].ty, ColumnType::Float);
        assert_eq!(table.columns()[2].ty, ColumnType::Boolean);
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_to_csv_with_and_without_header() {
        let table = table_of(&["id", "city"], &[&["1", "sao paulo"]]);

        let with_header = String::from_utf8(table.to_csv(true).unwrap()).unwrap();
        assert_eq!(with_header, "id,city\n1,sao paulo\n");

        let without_header = table.to_csv(false).unwrap();
        assert_eq!(String::from_utf8(without_header).unwrap(), "1,sao paulo\n");
    }
}
