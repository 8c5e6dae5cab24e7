// Integration tests for the evaluator, built-in library and extension layer
//
// ASTs are built with the `AstNode` constructors (or decoded from JSON) and
// evaluated against documents built with `serde_json::json!`.

use jmespath_core::{
    custom::{register_function, Executor, FunctionRegistry},
    search, search_json, AstNode, Comparator, Evaluator, EvaluatorError, HostRecord, JValue,
    RecordField,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn evaluator() -> Evaluator {
    Evaluator::builder().registry(FunctionRegistry::new()).build()
}

fn call(name: &str, args: Vec<serde_json::Value>) -> Result<JValue, EvaluatorError> {
    let ast = AstNode::function(name, args.into_iter().map(AstNode::literal).collect());
    evaluator().evaluate(&ast, &JValue::Null)
}

fn expref(field: &str) -> AstNode {
    AstNode::expref(AstNode::field(field))
}

#[test]
fn test_nested_field_access() {
    let data: JValue = json!({
        "user": {
            "profile": {
                "name": "Bob"
            }
        }
    })
    .into();

    let ast = AstNode::subexpr(
        AstNode::subexpr(AstNode::field("user"), AstNode::field("profile")),
        AstNode::field("name"),
    );
    let result = search(&ast, &data).unwrap();

    assert_eq!(result, JValue::from(json!("Bob")));
}

#[test]
fn test_reverse_is_an_involution() {
    for input in [json!([1, "two", [3], {"four": 4}]), json!("héllo wörld"), json!([])] {
        let ast = AstNode::function(
            "reverse",
            vec![AstNode::function("reverse", vec![AstNode::literal(input.clone())])],
        );
        assert_eq!(evaluator().evaluate(&ast, &JValue::Null).unwrap(), JValue::from(input));
    }
}

#[test]
fn test_sort_by_and_dedup_by_are_stable() {
    let data: JValue = json!({
        "people": [
            {"name": "ann", "team": "b"},
            {"name": "bob", "team": "a"},
            {"name": "cat", "team": "b"},
            {"name": "dan", "team": "a"}
        ]
    })
    .into();

    let sorted = AstNode::projection(
        AstNode::function("sort_by", vec![AstNode::field("people"), expref("team")]),
        AstNode::field("name"),
    );
    assert_eq!(
        evaluator().evaluate(&sorted, &data).unwrap(),
        JValue::from(json!(["bob", "dan", "ann", "cat"]))
    );

    let deduped = AstNode::projection(
        AstNode::function("dedup_by", vec![AstNode::field("people"), expref("team")]),
        AstNode::field("name"),
    );
    assert_eq!(
        evaluator().evaluate(&deduped, &data).unwrap(),
        JValue::from(json!(["ann", "bob"]))
    );
}

#[test]
fn test_zip_length_is_the_shortest_input() {
    let result = call("zip", vec![json!([1, 2, 3, 4]), json!(["a", "b"]), json!([true, false, true])]).unwrap();
    assert_eq!(result, JValue::from(json!([[1, "a", true], [2, "b", false]])));
}

#[test]
fn test_merge_later_argument_wins() {
    let result = call("merge", vec![json!({"a": 1}), json!({"a": 2}), json!({"b": 3})]).unwrap();
    assert_eq!(result, JValue::from(json!({"a": 2, "b": 3})));
}

#[test]
fn test_builtin_and_ast_slices() {
    let data = json!([0, 1, 2, 3, 4]);
    assert_eq!(
        call("slice", vec![data.clone(), json!(1), json!(4)]).unwrap(),
        JValue::from(json!([1, 2, 3]))
    );

    let ev = evaluator();
    let doc = JValue::from(data);
    assert_eq!(
        ev.evaluate(&AstNode::slice(Some(1), Some(4), None), &doc).unwrap(),
        JValue::from(json!([1, 2, 3]))
    );
    assert_eq!(
        ev.evaluate(&AstNode::slice(Some(-2), None, None), &doc).unwrap(),
        JValue::from(json!([3, 4]))
    );
    assert_eq!(
        ev.evaluate(&AstNode::slice(Some(1), None, Some(i64::MAX)), &doc).unwrap(),
        JValue::from(json!([1]))
    );
    assert_eq!(
        call("slice", vec![json!([0, 1, 2, 3]), json!("1"), json!(10), json!(1e19)]).unwrap(),
        JValue::from(json!([1]))
    );
}

#[test]
fn test_from_items_accumulates_repeated_keys() {
    let result = call("from_items", vec![json!([["k", 1], ["k", 2]])]).unwrap();
    assert_eq!(result, JValue::from(json!({"k": [1, 2]})));
}

#[test]
fn test_not_null() {
    assert_eq!(call("not_null", vec![json!(null), json!(null), json!(5)]).unwrap(), JValue::from(json!(5)));
    assert_eq!(call("not_null", vec![json!(null)]).unwrap(), JValue::Null);
}

#[test]
fn test_or_false_like_set() {
    let ev = evaluator();
    for left in [json!(false), json!(null), json!(""), json!([]), json!({})] {
        let ast = AstNode::or(AstNode::literal(left.clone()), AstNode::literal(json!("right")));
        assert_eq!(ev.evaluate(&ast, &JValue::Null).unwrap(), JValue::from(json!("right")), "{}", left);
    }
    let ast = AstNode::or(AstNode::literal(json!(0)), AstNode::literal(json!("right")));
    assert_eq!(ev.evaluate(&ast, &JValue::Null).unwrap(), JValue::from(json!(0)));
}

#[test]
fn test_max_by_rejects_mixed_key_kinds() {
    let items = json!([{"k": 3}, {"k": 1}, {"k": "x"}]);
    for name in ["max_by", "min_by"] {
        let ast = AstNode::function(name, vec![AstNode::literal(items.clone()), expref("k")]);
        let err = evaluator().evaluate(&ast, &JValue::Null).unwrap_err();
        assert!(err.is_type_error(), "{}: {}", name, err);
    }
}

#[test]
fn test_late_registration_is_invisible_to_built_evaluators() {
    let ast = AstNode::function("late_registered_answer", vec![]);
    let before = Evaluator::new();
    register_function("late_registered_answer", |_: &[JValue], _: &Executor<'_>| {
        Ok(JValue::from(42.0))
    });
    let after = Evaluator::new();

    assert!(matches!(
        before.evaluate(&ast, &JValue::Null).unwrap_err(),
        EvaluatorError::UnknownFunction(_)
    ));
    assert_eq!(after.evaluate(&ast, &JValue::Null).unwrap(), JValue::from(42.0));
}

#[test]
fn test_length_counts_unicode_scalar_values() {
    assert_eq!(call("length", vec![json!("héllo")]).unwrap(), JValue::from(5.0));
}

#[test]
fn test_custom_function_reenters_evaluator() {
    let mut registry = FunctionRegistry::new();
    registry.register("count_where", |args: &[JValue], ex: &Executor<'_>| {
        let [items, predicate] = args else {
            return Err(EvaluatorError::Custom("count_where takes 2 arguments".to_string()));
        };
        let items = items
            .as_array()
            .ok_or_else(|| EvaluatorError::Custom("count_where expects an array".to_string()))?;
        let mut count = 0usize;
        for item in items.iter() {
            if !ex.execute(predicate, item)?.is_false_like() {
                count += 1;
            }
        }
        Ok(JValue::from(count))
    });
    let ev = Evaluator::builder().registry(registry).build();

    let data: JValue = json!({"limit": 2, "values": [1, 2, 3, 4]}).into();
    // count_where(values, &(@ > $.limit))
    let ast = AstNode::function(
        "count_where",
        vec![
            AstNode::field("values"),
            AstNode::expref(AstNode::compare(
                Comparator::GreaterThan,
                AstNode::CurrentNode,
                AstNode::subexpr(AstNode::RootNode, AstNode::field("limit")),
            )),
        ],
    );
    assert_eq!(ev.evaluate(&ast, &data).unwrap(), JValue::from(2.0));
}

#[test]
fn test_errors_abort_the_whole_evaluation() {
    let data: JValue = json!({"obj": {"a": 1}}).into();
    let ast = AstNode::MultiSelectList(vec![
        AstNode::field("obj"),
        AstNode::function("get", vec![AstNode::field("obj"), AstNode::literal(json!("b"))]),
    ]);
    let err = evaluator().evaluate(&ast, &data).unwrap_err();
    assert!(matches!(err, EvaluatorError::KeyNotFound(ref key) if key == "b"));
    assert_eq!(err.to_string(), "Key not found: b");
}

#[test]
fn test_arity_and_type_errors() {
    let err = call("starts_with", vec![json!("abc")]).unwrap_err();
    assert!(err.is_arity_error());
    assert_eq!(err.to_string(), "starts_with: expected exactly 2 arguments, got 1");

    let err = call("abs", vec![json!("x")]).unwrap_err();
    assert!(err.is_type_error());
    assert!(err.to_string().contains("expected: number"));
}

#[test]
fn test_search_json_round_trip() {
    let ast = AstNode::filter_projection(
        AstNode::field("items"),
        AstNode::field("id"),
        AstNode::compare(Comparator::Equal, AstNode::field("ok"), AstNode::literal(json!(true))),
    );
    let ast_json = ast.to_json().unwrap();
    let out = search_json(&ast_json, r#"{"items":[{"id":1,"ok":true},{"id":2},{"id":12345678901234567890,"ok":true}]}"#)
        .unwrap();
    assert_eq!(out, "[1,12345678901234567890]");

    assert!(matches!(
        search_json(r#"{"NoSuchNode": 1}"#, "{}").unwrap_err(),
        EvaluatorError::UnknownNode(_)
    ));
    assert!(matches!(
        search_json(&ast_json, "{not json").unwrap_err(),
        EvaluatorError::Serialization(_)
    ));
}

#[derive(Debug)]
struct Inventory {
    owner: &'static str,
    items: Vec<JValue>,
}

impl HostRecord for Inventory {
    fn type_name(&self) -> &str {
        "Inventory"
    }

    fn fields(&self) -> Vec<RecordField> {
        vec![RecordField::tagged("Owner", "owner_name", JValue::string(self.owner))]
    }

    fn elements(&self) -> Option<Vec<JValue>> {
        Some(self.items.clone())
    }
}

#[test]
fn test_host_sequences_behave_like_arrays() {
    let inventory = JValue::record(Inventory {
        owner: "ada",
        items: vec![
            JValue::from(json!({"sku": "a", "qty": 0})),
            JValue::from(json!({"sku": "b", "qty": 3})),
            JValue::from(json!([1, 2])),
        ],
    });
    let ev = evaluator();

    let flat = ev.evaluate(&AstNode::flatten(AstNode::Identity), &inventory).unwrap();
    assert_eq!(flat.length(), 4);

    let in_stock = AstNode::filter_projection(
        AstNode::Identity,
        AstNode::field("sku"),
        AstNode::compare(Comparator::GreaterThan, AstNode::field("qty"), AstNode::literal(json!(0))),
    );
    // the array element fails the numeric comparison
    assert!(ev.evaluate(&in_stock, &inventory).unwrap_err().is_type_error());

    let owner = ev.evaluate(&AstNode::field("owner_name"), &inventory).unwrap();
    assert_eq!(owner, JValue::string("ada"));

    let sorted = AstNode::function("length", vec![AstNode::Identity]);
    assert_eq!(ev.evaluate(&sorted, &inventory).unwrap(), JValue::from(3.0));
    assert_eq!(
        inventory.to_json_string().unwrap(),
        r#"[{"sku":"a","qty":0},{"sku":"b","qty":3},[1,2]]"#
    );
}
