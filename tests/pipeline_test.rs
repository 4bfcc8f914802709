// ==========================================
// 管道驱动器集成测试
// ==========================================
// 测试目标: 阶段顺序、逐表装载、首次失败即终止
// ==========================================


use olist_etl::error::EtlError;
use olist_etl::logging;
use olist_etl::pipeline::PipelineDriver;
use test_helpers::{ScriptedHub, ScriptedSink};

const SLUG: &str = "olistbr/brazilian-ecommerce";
const CONTAINER: &str = "raw_olist";

#[test]
fn test_full_run_loads_every_table_in_order() {
    logging::init_test();

    let tmp = tempfile::tempdir().expect("Failed to create tempdir");
    let cache = tmp.path().join("cache");
    let hub = ScriptedHub::new(&[
        ("olist_orders_dataset.csv", "order_id\no1\no2\n"),
        ("olist_customers_dataset.csv", "customer_id\nc1\n"),
    ]);
    let mut sink = ScriptedSink::default();

    let report = {
        let mut driver = PipelineDriver::new(&hub, &mut sink);
        driver
            .run(SLUG, cache.to_str().unwrap(), CONTAINER)
            .expect("pipeline should succeed")
    };

    // 容器先于一切装载被确保存在，装载按集合顺序进行
    assert_eq!(
        sink.events,
        vec!["ensure:raw_olist", "load:customers", "load:orders"]
    );
    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.total_rows(), 3);
}

#[test]
fn test_first_load_failure_stops_the_run() {
    logging::init_test();

    let tmp = tempfile::tempdir().expect("Failed to create tempdir");
    let cache = tmp.path().join("cache");
    let hub = ScriptedHub::new(&[
        ("olist_a_dataset.csv", "id\n1\n"),
        ("olist_b_dataset.csv", "id\n2\n"),
        ("olist_c_dataset.csv", "id\n3\n"),
    ]);
    // 第 2 张表（集合顺序 a, b, c）注入失败
    let mut sink = ScriptedSink::failing_on("b");

    let err = {
        let mut driver = PipelineDriver::new(&hub, &mut sink);
        driver
            .run(SLUG, cache.to_str().unwrap(), CONTAINER)
            .unwrap_err()
    };

    match err {
        EtlError::TableLoad { table, .. } => assert_eq!(table, "b"),
        other => panic!("expected TableLoad, got {:?}", other),
    }

    // 表 a 已装载且保持装载，表 c 从未被尝试
    assert_eq!(sink.loaded, vec![("a".to_string(), 1)]);
    assert_eq!(sink.events, vec!["ensure:raw_olist", "load:a", "load:b"]);
}

#[test]
fn test_container_failure_aborts_before_extraction() {
    logging::init_test();

    struct RefusingSink;
    impl olist_etl::sink::Sink for RefusingSink {
        fn kind(&self) -> &'static str {
            "refusing"
        }
        fn ensure_container(&mut self, container: &str) -> olist_etl::EtlResult<()> {
            Err(EtlError::Container {
                container: container.to_string(),
                message: "permission denied".to_string(),
            })
        }
        fn load_table(
            &mut self,
            _container: &str,
            _table_name: &str,
            _table: &olist_etl::DataTable,
        ) -> olist_etl::EtlResult<()> {
            unreachable!("no load may be attempted after a container failure")
        }
    }

    let tmp = tempfile::tempdir().expect("Failed to create tempdir");
    let cache = tmp.path().join("cache");
    let hub = ScriptedHub::new(&[("olist_orders_dataset.csv", "id\n1\n")]);
    let mut sink = RefusingSink;

    let mut driver = PipelineDriver::new(&hub, &mut sink);
    let err = driver
        .run(SLUG, cache.to_str().unwrap(), CONTAINER)
        .unwrap_err();

    assert!(matches!(err, EtlError::Container { .. }));
    // 容器失败发生在采集之前，下载从未被调用
    assert_eq!(hub.download_calls(), 0);
}
