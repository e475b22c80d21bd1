//! Scenario tests for metric model admission

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::models::{
        CondCfg, MetricDataSource, MetricModelDraft, MetricTask, MetricType, OrderField,
        QueryType, Schedule, UnitType,
    };
    use crate::services::metric_validator::*;

    /// `{"<name>": {"<agg_type>": body, "aggs": child}}`
    fn level(name: &str, agg_type: &str, body: Value, child: Option<Value>) -> Value {
        let mut definition = serde_json::Map::new();
        definition.insert(agg_type.to_string(), body);
        if let Some(child) = child {
            definition.insert("aggs".to_string(), child);
        }
        let mut level = serde_json::Map::new();
        level.insert(name.to_string(), Value::Object(definition));
        Value::Object(level)
    }

    fn formula(root: Value) -> String {
        json!({"size": 0, "aggs": root}).to_string()
    }

    fn date_histogram(name: &str, child: Option<Value>) -> Value {
        level(name, "date_histogram", json!({"field": "@timestamp", "fixed_interval": "1d"}), child)
    }

    fn terms(name: &str, child: Option<Value>) -> Value {
        level(name, "terms", json!({"field": name, "size": 10}), child)
    }

    fn max(name: &str) -> Value {
        level(name, "max", json!({"field": "v"}), None)
    }

    /// `n` terms levels wrapped around `inner`
    fn nested_terms(n: usize, inner: Value) -> Value {
        (0..n).rev().fold(inner, |child, i| terms(&format!("t{}", i), Some(child)))
    }

    // ========================================================================
    // Aggregation tree
    // ========================================================================

    mod formula_tests {
        use super::*;

        #[test]
        fn test_terms_date_histogram_max() {
            let dsl = r#"{"size":0,"aggs":{"a":{"terms":{"field":"f","size":10},"aggs":{"b":{"date_histogram":{"field":"@timestamp","fixed_interval":"1d"},"aggs":{"c":{"max":{"field":"v"}}}}}}}}"#;
            let mut ctx = MetricModelContext::new(None, Some("c".into()));

            validate_formula(dsl, &mut ctx).unwrap();

            assert_eq!(ctx.declared_date_field.as_deref(), Some("b"));
            assert_eq!(ctx.declared_measure_field.as_deref(), Some("c"));
            assert!(!ctx.is_calendar_interval);
            assert!(!ctx.contains_top_hits);
        }

        #[test]
        fn test_both_intervals_is_ambiguous() {
            let dsl = r#"{"size":0,"aggs":{"a":{"terms":{"field":"f","size":10},"aggs":{"b":{"date_histogram":{"field":"@timestamp","fixed_interval":"1d","calendar_interval":"1d"},"aggs":{"c":{"max":{"field":"v"}}}}}}}}"#;
            let mut ctx = MetricModelContext::new(None, Some("c".into()));

            let err = validate_formula(dsl, &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::AmbiguousInterval(_)));
        }

        #[test]
        fn test_sibling_aggregations_rejected_at_any_level() {
            let top = json!({"size": 0, "aggs": {"x": {"max": {"field": "v"}}, "y": {"min": {"field": "v"}}}});
            let mut ctx = MetricModelContext::default();
            let err = validate_formula(top.to_string(), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MultipleAggregations(_)));

            let mut siblings = max("c");
            siblings["d"] = json!({"min": {"field": "v"}});
            let nested = formula(terms("a", Some(date_histogram("b", Some(siblings)))));
            let err = validate_formula(nested, &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MultipleAggregations(_)));
        }

        #[test]
        fn test_top_hits_invalid_size() {
            let root = date_histogram(
                "b",
                Some(level("t", "top_hits", json!({"size": -1, "_source": {"includes": ["cpu"]}}), None)),
            );
            let mut ctx = MetricModelContext::new(None, Some("cpu".into()));

            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidTopHitsSize(_)));
        }

        #[test]
        fn test_top_hits_stands_in_for_metric() {
            let root = date_histogram(
                "b",
                Some(level(
                    "t",
                    "top_hits",
                    json!({"size": 1, "_source": {"includes": ["host", "cpu"]}}),
                    None,
                )),
            );
            let mut ctx = MetricModelContext::new(None, Some("cpu".into()));

            validate_formula(formula(root), &mut ctx).unwrap();
            assert!(ctx.contains_top_hits);
            assert_eq!(ctx.declared_date_field.as_deref(), Some("b"));
        }

        #[test]
        fn test_top_hits_without_matching_measure_field() {
            let root = date_histogram(
                "b",
                Some(level("t", "top_hits", json!({"size": 1, "_source": {"includes": ["cpu"]}}), None)),
            );
            let mut ctx = MetricModelContext::new(None, Some("mem".into()));

            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MeasureFieldNotInTopHitsIncludes(_)));
        }

        #[test]
        fn test_seven_levels_accepted() {
            let root = nested_terms(5, date_histogram("d", Some(max("m"))));
            let mut ctx = MetricModelContext::new(None, Some("m".into()));

            validate_formula(formula(root), &mut ctx).unwrap();
            assert_eq!(ctx.declared_date_field.as_deref(), Some("d"));
        }

        #[test]
        fn test_eight_levels_too_deep() {
            // otherwise well formed
            let root = nested_terms(6, date_histogram("d", Some(max("m"))));
            let mut ctx = MetricModelContext::new(None, Some("m".into()));
            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::TooDeep(_)));

            // no metric at all: depth is reported before the missing metric
            let root = nested_terms(7, terms("last", None));
            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::TooDeep(_)));
        }

        #[test]
        fn test_duplicate_name_across_levels() {
            let root = terms("a", Some(date_histogram("a", Some(max("c")))));
            let mut ctx = MetricModelContext::default();

            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::DuplicateAggregationName(_)));
        }

        #[test]
        fn test_metric_must_directly_follow_date_histogram() {
            let root = date_histogram("b", Some(terms("host", Some(max("c")))));
            let mut ctx = MetricModelContext::new(None, Some("c".into()));

            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MetricNotDirectChildOfDateHistogram(_)));
        }

        #[test]
        fn test_date_histogram_and_metric_counts() {
            let mut ctx = MetricModelContext::default();

            let two_histograms = date_histogram("a", Some(date_histogram("b", Some(max("c")))));
            let err = validate_formula(formula(two_histograms), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MissingOrDuplicateDateHistogram(_)));

            let no_histogram = terms("a", Some(max("c")));
            let err = validate_formula(formula(no_histogram), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MissingOrDuplicateDateHistogram(_)));

            let no_metric = terms("a", Some(date_histogram("b", None)));
            let err = validate_formula(formula(no_metric), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MissingOrDuplicateMetricAggregation(_)));
        }

        #[test]
        fn test_declared_fields_must_match_tree() {
            let root = date_histogram("b", Some(max("c")));

            let mut ctx = MetricModelContext::new(None, Some("other".into()));
            let err = validate_formula(formula(root.clone()), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::MeasureFieldMismatch(_)));

            let mut ctx = MetricModelContext::new(Some("ts".into()), Some("c".into()));
            let err = validate_formula(formula(root), &mut ctx).unwrap_err();
            assert!(matches!(err, ValidationError::DateFieldMismatch(_)));
        }

        #[test]
        fn test_unset_measure_field_has_no_default() {
            let root = date_histogram("b", Some(max("c")));
            let mut ctx = MetricModelContext::default();

            validate_formula(formula(root), &mut ctx).unwrap();
            assert_eq!(ctx.declared_date_field.as_deref(), Some("b"));
            assert_eq!(ctx.declared_measure_field, None);
        }

        #[test]
        fn test_context_untouched_on_failure() {
            let root = level(
                "b",
                "date_histogram",
                json!({"field": "@timestamp", "calendar_interval": "1M"}),
                Some(terms("host", Some(max("c")))),
            );
            let mut ctx = MetricModelContext::new(None, Some("c".into()));
            let before = ctx.clone();

            assert!(validate_formula(formula(root), &mut ctx).is_err());
            assert_eq!(ctx, before);
        }

        #[test]
        fn test_revalidation_is_idempotent() {
            let root = level(
                "b",
                "date_histogram",
                json!({"field": "@timestamp", "calendar_interval": "1M"}),
                Some(max("c")),
            );
            let dsl = formula(root);
            let mut ctx = MetricModelContext::new(None, Some("c".into()));

            validate_formula(&dsl, &mut ctx).unwrap();
            let normalized = ctx.clone();
            assert!(normalized.is_calendar_interval);

            validate_formula(&dsl, &mut ctx).unwrap();
            assert_eq!(ctx, normalized);
        }
    }

    // ========================================================================
    // Condition trees
    // ========================================================================

    mod condition_tests {
        use super::*;

        fn leaf(i: usize) -> CondCfg {
            CondCfg::leaf(format!("f{}", i), "eq", json!(i))
        }

        #[test]
        fn test_none_and_empty_are_no_filter() {
            assert!(validate_condition(None).is_ok());
            assert!(validate_condition(Some(&CondCfg::default())).is_ok());
        }

        #[test]
        fn test_sub_condition_limit() {
            let ten = CondCfg::composite("and", (0..10).map(leaf).collect());
            assert!(validate_condition(Some(&ten)).is_ok());

            let eleven = CondCfg::composite("and", (0..11).map(leaf).collect());
            let err = validate_condition(Some(&eleven)).unwrap_err();
            assert!(matches!(err, ValidationError::TooManySubconditions(_)));
        }

        #[test]
        fn test_reserved_field_forbidden() {
            let cfg: CondCfg =
                serde_json::from_value(json!({"name": "__id", "operation": "eq", "value": 1})).unwrap();
            let err = validate_condition(Some(&cfg)).unwrap_err();
            assert!(matches!(err, ValidationError::ForbiddenFilterField(_)));
        }

        #[test]
        fn test_in_requires_non_empty_array() {
            for value in [json!("a"), json!(1), json!({"a": 1}), json!([])] {
                let cfg = CondCfg::leaf("host", "in", value);
                let err = validate_condition(Some(&cfg)).unwrap_err();
                assert!(matches!(err, ValidationError::InvalidFilterValueShape { .. }));
            }
            for value in [json!(["a"]), json!([1, "b", true])] {
                let cfg = CondCfg::leaf("host", "not_in", value);
                assert!(validate_condition(Some(&cfg)).is_ok());
            }
        }

        #[test]
        fn test_errors_inside_nested_children_surface() {
            let tree = CondCfg::composite(
                "or",
                vec![
                    leaf(0),
                    CondCfg::composite("and", vec![CondCfg::leaf("host", "like", json!(["a"]))]),
                ],
            );
            let err = validate_condition(Some(&tree)).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidFilterValueShape { ref operation, .. } if operation == "like"
            ));
        }

        #[test]
        fn test_leaf_rules() {
            let no_op: CondCfg = serde_json::from_value(json!({"name": "a", "value": 1})).unwrap();
            assert!(matches!(
                validate_condition(Some(&no_op)).unwrap_err(),
                ValidationError::MissingOperation(_)
            ));

            let unknown = CondCfg::leaf("a", "contains", json!("x"));
            assert!(matches!(
                validate_condition(Some(&unknown)).unwrap_err(),
                ValidationError::UnsupportedOperation(_)
            ));

            let no_field = CondCfg::leaf("", "eq", json!("x"));
            assert!(matches!(
                validate_condition(Some(&no_field)).unwrap_err(),
                ValidationError::MissingFieldName(_)
            ));

            let range = CondCfg::leaf("a", "between", json!([1, 2, 3]));
            assert!(validate_condition(Some(&range)).is_err());
            let range = CondCfg::leaf("a", "out_range", json!([1, 2]));
            assert!(validate_condition(Some(&range)).is_ok());
        }
    }

    // ========================================================================
    // Whole model
    // ========================================================================

    mod model_tests {
        use super::*;

        fn atomic(query_type: QueryType, formula: &str) -> MetricModelDraft {
            MetricModelDraft {
                name: " cpu_usage ".into(),
                metric_type: Some(MetricType::Atomic),
                data_source: Some(MetricDataSource {
                    source_type: "data_view".into(),
                    id: "dv-1".into(),
                    name: None,
                }),
                query_type: Some(query_type),
                formula: formula.into(),
                unit_type: Some(UnitType::StoreUnit),
                unit: "KB".into(),
                ..Default::default()
            }
        }

        fn task(steps: &[&str]) -> MetricTask {
            MetricTask {
                name: "persist".into(),
                schedule: Schedule { schedule_type: "FIX_RATE".into(), expression: "5m".into() },
                steps: steps.iter().map(|s| s.to_string()).collect(),
                index_base: "metrics".into(),
                ..Default::default()
            }
        }

        #[test]
        fn test_promql_defaults() {
            let mut draft = atomic(QueryType::Promql, "sum(rate(cpu_seconds_total[5m]))");
            validate_metric_model(&mut draft).unwrap();

            assert_eq!(draft.name, "cpu_usage");
            assert_eq!(draft.date_field, "@timestamp");
            assert_eq!(draft.measure_field, "value");
            assert_eq!(draft.unit, "KiB");
        }

        #[test]
        fn test_promql_fixed_fields() {
            let mut draft = atomic(QueryType::Promql, "up");
            draft.date_field = "ts".into();
            let err = validate_metric_model(&mut draft).unwrap_err();
            assert!(matches!(err, ValidationError::DateFieldMismatch(_)));
        }

        #[test]
        fn test_dsl_copies_formula_results() {
            let dsl = formula(level(
                "ts",
                "date_histogram",
                json!({"field": "@timestamp", "calendar_interval": "1d"}),
                Some(max("v")),
            ));
            let mut draft = atomic(QueryType::Dsl, &dsl);
            draft.measure_field = "v".into();

            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft.date_field, "ts");
            assert!(draft.is_calendar_interval);
            assert!(!draft.contains_top_hits);

            // normalized drafts pass again unchanged
            let normalized = draft.clone();
            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft, normalized);
        }

        #[test]
        fn test_dsl_requires_measure_field() {
            let dsl = formula(date_histogram("ts", Some(max("v"))));
            let mut draft = atomic(QueryType::Dsl, &dsl);

            let err = validate_metric_model(&mut draft).unwrap_err();
            assert_eq!(err, ValidationError::missing_parameter("measure_field"));
        }

        #[test]
        fn test_dsl_formula_errors_surface() {
            let mut draft = atomic(QueryType::Dsl, r#"{"size": 1, "aggs": {}}"#);
            draft.measure_field = "v".into();
            let err = validate_metric_model(&mut draft).unwrap_err();
            assert!(matches!(err, ValidationError::MalformedFormula(_)));
        }

        #[test]
        fn test_sql_normalization() {
            let mut draft = atomic(QueryType::Sql, "");
            draft.formula_config = Some(json!({
                "aggr_expression": {"field": "bytes", "aggr": ""},
                "aggr_expression_str": "sum(bytes)",
                "condition": {"name": "status", "operation": "in", "value": [200, 204]}
            }));
            draft.task = Some(task(&["5m"]));

            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft.measure_field, "__sql_value");
            assert!(draft.is_calendar_interval);
            assert!(draft.task.is_none());
            let config = draft.formula_config.unwrap();
            assert!(config.get("aggr_expression").is_none());
            assert_eq!(config["aggr_expression_str"], "sum(bytes)");
        }

        #[test]
        fn test_sql_aggregation_rules() {
            let mut draft = atomic(QueryType::Sql, "");
            draft.formula_config = Some(json!({}));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::MissingParameter(_)
            ));

            let mut draft = atomic(QueryType::Sql, "");
            draft.formula_config = Some(json!({
                "aggr_expression": {"field": "bytes", "aggr": "sum"},
                "aggr_expression_str": "sum(bytes)"
            }));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::InvalidParameter { .. }
            ));

            let mut draft = atomic(QueryType::Sql, "");
            draft.formula_config = Some(json!({
                "aggr_expression_str": "sum(bytes)",
                "condition": {"name": "__routing", "operation": "eq", "value": "x"}
            }));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::ForbiddenFilterField(_)
            ));
        }

        #[test]
        fn test_derived_keeps_dependency_id_only() {
            let mut draft = MetricModelDraft {
                name: "derived".into(),
                metric_type: Some(MetricType::Derived),
                formula_config: Some(json!({
                    "depend_metric_model": {"id": "m-1", "name": "cpu", "group_name": "infra"},
                    "business_condition": {"name": "host", "operation": "eq", "value": "a"}
                })),
                unit_type: Some(UnitType::NumUnit),
                unit: "none".into(),
                ..Default::default()
            };

            validate_metric_model(&mut draft).unwrap();
            let config = draft.formula_config.unwrap();
            assert_eq!(config["depend_metric_model"], json!({"id": "m-1"}));
        }

        #[test]
        fn test_composite_formula_rules() {
            let composite = |formula: &str| MetricModelDraft {
                name: "ratio".into(),
                metric_type: Some(MetricType::Composite),
                formula: formula.into(),
                unit_type: Some(UnitType::NumUnit),
                unit: "none".into(),
                ..Default::default()
            };

            let mut draft = composite(" {{ m-1 }} / {{m-2}} ");
            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft.formula, "{{ m-1 }} / {{m-2}}");
            assert_eq!(model_references(&draft.formula), vec!["m-1", "m-2"]);

            assert!(matches!(
                validate_metric_model(&mut composite("")),
                Err(ValidationError::MissingParameter(_))
            ));
            assert!(matches!(
                validate_metric_model(&mut composite("{{ }} + 1")),
                Err(ValidationError::InvalidParameter { .. })
            ));
        }

        #[test]
        fn test_derived_condition_rules() {
            let base = MetricModelDraft {
                name: "derived".into(),
                metric_type: Some(MetricType::Derived),
                unit_type: Some(UnitType::NumUnit),
                unit: "K".into(),
                ..Default::default()
            };

            let mut draft = base.clone();
            draft.formula_config = Some(json!({"depend_metric_model": {"id": "m-1"}}));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::MissingParameter(_)
            ));

            let mut draft = base.clone();
            draft.formula_config = Some(json!({
                "depend_metric_model": {"id": "m-1"},
                "date_condition": {"name": "@timestamp", "operation": "before", "value": [1, "d"]},
                "condition_str": "host = 'a'"
            }));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::InvalidParameter { .. }
            ));

            let mut draft = base;
            draft.formula_config = Some(json!({"depend_metric_model": {"name": "cpu"}, "condition_str": "x"}));
            assert_eq!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::missing_parameter("formula_config.depend_metric_model.id")
            );
        }

        #[test]
        fn test_percent_forces_percentage_unit() {
            let mut draft = atomic(QueryType::Promql, "up");
            draft.unit_type = Some(UnitType::NumUnit);
            draft.unit = "%".into();

            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft.unit_type, Some(UnitType::PercentageUnit));

            let mut draft = atomic(QueryType::Promql, "up");
            draft.unit = "kg".into();
            assert!(validate_metric_model(&mut draft).is_err());
        }

        #[test]
        fn test_measure_name_rule() {
            for name in ["__m.cpu", "__m.9_load", ""] {
                let mut draft = atomic(QueryType::Promql, "up");
                draft.measure_name = name.into();
                assert!(validate_metric_model(&mut draft).is_ok(), "{}", name);
            }
            for name in ["cpu", "__m._cpu", "__m.cpu-load", "__mxcpu"] {
                let mut draft = atomic(QueryType::Promql, "up");
                draft.measure_name = name.into();
                assert!(validate_metric_model(&mut draft).is_err(), "{}", name);
            }
            let mut draft = atomic(QueryType::Promql, "up");
            draft.measure_name = format!("__m.{}", "a".repeat(37));
            assert!(validate_metric_model(&mut draft).is_err());
        }

        #[test]
        fn test_tags_trimmed_and_deduplicated() {
            let mut draft = atomic(QueryType::Promql, "up");
            draft.tags = vec![" infra".into(), "infra ".into(), "cpu".into()];
            validate_metric_model(&mut draft).unwrap();
            assert_eq!(draft.tags, vec!["infra".to_string(), "cpu".to_string()]);

            let mut draft = atomic(QueryType::Promql, "up");
            draft.tags = vec!["a/b".into()];
            assert!(validate_metric_model(&mut draft).is_err());
        }

        #[test]
        fn test_order_by_and_having() {
            let mut draft = atomic(QueryType::Promql, "up");
            draft.order_by_fields = vec![OrderField { name: "host".into(), direction: "up".into() }];
            assert!(validate_metric_model(&mut draft).is_err());

            let mut draft = atomic(QueryType::Promql, "up");
            draft.order_by_fields = vec![OrderField { name: "host".into(), direction: "desc".into() }];
            draft.having_condition = Some(CondCfg::leaf("__value", "gt", json!(90)));
            assert!(validate_metric_model(&mut draft).is_ok());

            draft.having_condition = Some(CondCfg::leaf("__value", "like", json!("9")));
            assert!(matches!(
                validate_metric_model(&mut draft).unwrap_err(),
                ValidationError::UnsupportedOperation(_)
            ));
        }

        #[test]
        fn test_task_rules() {
            let promql = Some(QueryType::Promql);
            let dsl = Some(QueryType::Dsl);

            assert!(validate_task(promql, &task(&["5m", "1h"])).is_ok());
            assert!(validate_task(promql, &task(&[])).is_err());
            assert!(validate_task(promql, &task(&["7m"])).is_err());
            assert!(validate_task(promql, &task(&["5m", "5m"])).is_err());

            let mut t = task(&["5m"]);
            t.index_base.clear();
            assert!(validate_task(promql, &t).is_err());

            let mut t = task(&["5m"]);
            t.time_windows = vec!["1h".into()];
            assert!(validate_task(promql, &t).is_err());
            assert!(validate_task(dsl, &t).is_ok());

            t.time_windows = vec!["1h".into(), "1h".into()];
            assert!(validate_task(dsl, &t).is_err());
            t.time_windows.clear();
            assert!(validate_task(dsl, &t).is_err());
        }

        #[test]
        fn test_task_schedule_and_retrace() {
            let promql = Some(QueryType::Promql);

            let mut t = task(&["5m"]);
            t.schedule = Schedule { schedule_type: "CRON".into(), expression: "0 */5 * * * *".into() };
            assert!(validate_task(promql, &t).is_ok());
            t.schedule.expression = "*/5 * * * *".into();
            assert!(validate_task(promql, &t).is_err());

            for garbage in ["a b c d e f", "99 * * * * *"] {
                t.schedule.expression = garbage.into();
                match validate_task(promql, &t) {
                    Err(ValidationError::InvalidParameter { parameter, .. }) => {
                        assert_eq!(parameter, "task.schedule.expression")
                    },
                    other => panic!("Expected invalid cron for {:?}, got {:?}", garbage, other),
                }
            }

            t.schedule = Schedule { schedule_type: "FIX_RATE".into(), expression: "0m".into() };
            assert!(validate_task(promql, &t).is_err());
            t.schedule.schedule_type = "ONCE".into();
            assert!(validate_task(promql, &t).is_err());

            let mut t = task(&["5m"]);
            t.retrace_duration = "30d".into();
            assert!(validate_task(promql, &t).is_ok());
            // 40 days of 5m points is 11520 > 10000
            t.retrace_duration = "40d".into();
            assert!(validate_task(promql, &t).is_err());
            t.steps = vec!["1h".into()];
            assert!(validate_task(promql, &t).is_ok());
            t.retrace_duration = "30m".into();
            assert!(validate_task(promql, &t).is_err());
        }
    }
}
