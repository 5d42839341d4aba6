use std::sync::Arc;

use rowagg_core::arrays::datatype::DataType;
use rowagg_core::arrays::row::Row;
use rowagg_core::arrays::scalar::ScalarValue;
use rowagg_core::execution::planner::plan_aggregate::AggregateShape;
use rowagg_core::execution::source::{OnceSource, RowSource};
use rowagg_core::logical::logical_aggregate::{AggregateCallSpec, GroupSpec, LogicalAggregate};
use rowagg_core::testutil::{
    assert_rows_eq_unordered,
    collect_rows,
    compile,
    memory_source,
    row,
    run_aggregate,
};
use rowagg_error::ErrorKind;

const EMP_TYPES: [DataType; 2] = [DataType::Int32, DataType::Int64];

/// (dept, sal)
fn emp_rows() -> Vec<Row> {
    vec![
        Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(100)]),
        Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(200)]),
        Row::new(vec![ScalarValue::Int32(20), ScalarValue::Int64(50)]),
    ]
}

fn count_star() -> AggregateCallSpec {
    AggregateCallSpec::new("count", vec![], DataType::Int64)
}

fn sum_sal() -> AggregateCallSpec {
    AggregateCallSpec::new("sum", vec![1], DataType::Int64)
}

#[test]
fn group_by_dept_count_and_sum() {
    logutil::configure_test_logger();

    let agg = LogicalAggregate::new(GroupSpec::simple([0]), vec![count_star(), sum_sal()]);
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), emp_rows()).unwrap();

    let expected = vec![
        Row::new(vec![
            ScalarValue::Int32(10),
            ScalarValue::Int64(2),
            ScalarValue::Int64(300),
        ]),
        Row::new(vec![
            ScalarValue::Int32(20),
            ScalarValue::Int64(1),
            ScalarValue::Int64(50),
        ]),
    ];
    assert_rows_eq_unordered(&expected, &out);
}

#[test]
fn global_count_and_sum() {
    let agg = LogicalAggregate::new(GroupSpec::simple([]), vec![count_star(), sum_sal()]);
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), emp_rows()).unwrap();

    assert_eq!(vec![row([3_i64, 350])], out);
}

#[test]
fn global_count_on_empty_input() {
    let agg = LogicalAggregate::new(GroupSpec::simple([]), vec![count_star()]);
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), Vec::new()).unwrap();

    assert_eq!(vec![row([0_i64])], out);
}

#[test]
fn global_aggregate_on_empty_input_uses_neutral_results() {
    let agg = LogicalAggregate::new(
        GroupSpec::simple([]),
        vec![
            sum_sal(),
            AggregateCallSpec::new("sum0", vec![1], DataType::Int64),
            AggregateCallSpec::new("avg", vec![1], DataType::Float64),
            AggregateCallSpec::new("max", vec![1], DataType::Int64),
        ],
    );
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), Vec::new()).unwrap();

    assert_eq!(
        vec![Row::new(vec![
            ScalarValue::Null,
            ScalarValue::Int64(0),
            ScalarValue::Null,
            ScalarValue::Null,
        ])],
        out
    );
}

#[test]
fn global_aggregate_without_calls_emits_empty_row() {
    let agg = LogicalAggregate::new(GroupSpec::simple([]), vec![]);
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), emp_rows()).unwrap();

    assert_eq!(vec![Row::empty()], out);
}

#[test]
fn dedup_all_columns() {
    let agg = LogicalAggregate::new(GroupSpec::simple([0, 1]), vec![]);
    let input = vec![
        Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(100)]),
        Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(100)]),
        Row::new(vec![ScalarValue::Int32(20), ScalarValue::Int64(50)]),
    ];

    let compiled = compile(&agg, memory_source(EMP_TYPES.to_vec(), input)).unwrap();
    assert_eq!(AggregateShape::Distinct, compiled.shape());
    assert_eq!(&EMP_TYPES, compiled.output_types());

    let out = collect_rows(compiled.execute().unwrap()).unwrap();
    let expected = vec![
        Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(100)]),
        Row::new(vec![ScalarValue::Int32(20), ScalarValue::Int64(50)]),
    ];
    assert_rows_eq_unordered(&expected, &out);
}

#[test]
fn dedup_output_is_set_of_input_rows() {
    let input: Vec<Row> = (0..200).map(|i: i32| row([i % 7, (i * 3) % 5])).collect();
    let agg = LogicalAggregate::new(GroupSpec::simple([0, 1]), vec![]);
    let out = run_aggregate(&agg, vec![DataType::Int32, DataType::Int32], input.clone()).unwrap();

    let mut expected: Vec<Row> = Vec::new();
    for r in input {
        if !expected.contains(&r) {
            expected.push(r);
        }
    }
    assert_rows_eq_unordered(&expected, &out);
}

#[test]
fn null_group_keys_form_one_group() {
    let input = vec![
        Row::new(vec![ScalarValue::Null, ScalarValue::Int64(1)]),
        Row::new(vec![ScalarValue::Int32(1), ScalarValue::Int64(2)]),
        Row::new(vec![ScalarValue::Null, ScalarValue::Int64(3)]),
    ];
    let agg = LogicalAggregate::new(GroupSpec::simple([0]), vec![sum_sal()]);
    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), input).unwrap();

    let expected = vec![
        Row::new(vec![ScalarValue::Null, ScalarValue::Int64(4)]),
        Row::new(vec![ScalarValue::Int32(1), ScalarValue::Int64(2)]),
    ];
    assert_rows_eq_unordered(&expected, &out);
}

#[test]
fn distinct_call_rejected() {
    let agg = LogicalAggregate::new(
        GroupSpec::simple([0]),
        vec![count_star(), sum_sal().with_distinct(true)],
    );
    let err = compile(&agg, memory_source(EMP_TYPES.to_vec(), emp_rows())).unwrap_err();

    assert_eq!(ErrorKind::UnsupportedAggregation, err.kind());
}

#[test]
fn unregistered_function_rejected() {
    let agg = LogicalAggregate::new(
        GroupSpec::simple([0]),
        vec![AggregateCallSpec::new("percentile_cont", vec![1], DataType::Float64)],
    );
    let err = compile(&agg, memory_source(EMP_TYPES.to_vec(), emp_rows())).unwrap_err();

    assert_eq!(ErrorKind::UnsupportedAggregation, err.kind());
    assert_eq!("aggregation percentile_cont not supported", err.message());
}

#[test]
fn evaluation_error_terminates_stream() {
    let agg = LogicalAggregate::new(
        GroupSpec::simple([]),
        vec![AggregateCallSpec::new("single_value", vec![1], DataType::Int64)],
    );
    let compiled = compile(&agg, memory_source(EMP_TYPES.to_vec(), emp_rows())).unwrap();

    let mut stream = compiled.execute().unwrap();
    let err = stream.next().unwrap().unwrap_err();
    assert_eq!(ErrorKind::Generic, err.kind());
    assert!(stream.next().is_none());
}

#[test]
fn upstream_error_propagates() {
    let rows = vec![
        Ok(Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(1)])),
        Err(rowagg_error::DbError::new("upstream failed")),
    ];
    let source: Arc<dyn RowSource> = Arc::new(OnceSource::new(EMP_TYPES.to_vec(), rows));
    let agg = LogicalAggregate::new(GroupSpec::simple([0]), vec![count_star()]);

    let compiled = compile(&agg, source).unwrap();
    let err = collect_rows(compiled.execute().unwrap()).unwrap_err();
    assert_eq!("upstream failed", err.message());
}

#[test]
fn restartable_only_if_input_is() {
    let agg = LogicalAggregate::new(GroupSpec::simple([0]), vec![count_star(), sum_sal()]);

    let compiled = compile(&agg, memory_source(EMP_TYPES.to_vec(), emp_rows())).unwrap();
    let first = collect_rows(compiled.execute().unwrap()).unwrap();
    let second = collect_rows(compiled.execute().unwrap()).unwrap();
    assert_eq!(first, second);

    let once: Arc<dyn RowSource> = Arc::new(OnceSource::new(
        EMP_TYPES.to_vec(),
        emp_rows().into_iter().map(Ok),
    ));
    let compiled = compile(&agg, once).unwrap();
    collect_rows(compiled.execute().unwrap()).unwrap();
    assert!(compiled.execute().is_err());
}

#[test]
fn execution_is_lazy() {
    let rows = vec![Err(rowagg_error::DbError::new("should not be read yet"))];
    let source: Arc<dyn RowSource> = Arc::new(OnceSource::new(EMP_TYPES.to_vec(), rows));
    let agg = LogicalAggregate::new(GroupSpec::simple([]), vec![count_star()]);

    let compiled = compile(&agg, source).unwrap();
    let stream = compiled.execute().unwrap();
    // Dropping without polling never touches the input.
    drop(stream);
}

#[test]
fn load_aggregate_from_json() {
    let json = r#"{
        "group": {"group_set": [0], "grouping_sets": null, "indicator": false},
        "aggregates": [
            {"function": "count", "args": [], "distinct": false, "return_type": "Int64"},
            {"function": "sum", "args": [1], "distinct": false, "return_type": "Int64"}
        ]
    }"#;
    let agg: LogicalAggregate = serde_json::from_str(json).unwrap();
    assert_eq!(
        LogicalAggregate::new(GroupSpec::simple([0]), vec![count_star(), sum_sal()]),
        agg
    );

    let out = run_aggregate(&agg, EMP_TYPES.to_vec(), emp_rows()).unwrap();
    assert_eq!(2, out.len());
}
