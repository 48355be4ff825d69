use materials_tools::ToolError;
use materials_tools::model::{NumericArray, RawBuilder, RawDocument, RawNode, ScalarValue};
use materials_tools::normalize::{MAX_ARRAY_CONTAINERS, MAX_DEPTH, normalize};
use serde_json::{Value, json};

/// Small deterministic generator so the totality checks do not need a
/// randomness crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn generate(rng: &mut Lcg, depth: usize) -> Value {
    let choice = if depth == 0 {
        rng.next() % 4
    } else {
        rng.next() % 6
    };
    match choice {
        0 => Value::Null,
        1 => Value::Bool(rng.next() % 2 == 0),
        2 => json!((rng.next() % 1000) as f64 / 8.0),
        3 => Value::String(format!("s{}", rng.next() % 100)),
        4 => {
            let len = (rng.next() % 4) as usize;
            Value::Array((0..len).map(|_| generate(rng, depth - 1)).collect())
        }
        _ => {
            let len = (rng.next() % 4) as usize;
            let mut map = serde_json::Map::new();
            for index in 0..len {
                map.insert(format!("k{index}"), generate(rng, depth - 1));
            }
            if rng.next() % 5 == 0 {
                map.insert("@class".to_string(), json!("Structure"));
            }
            Value::Object(map)
        }
    }
}

fn max_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(max_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(max_depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[test]
fn acyclic_documents_up_to_depth_eight_normalize_unchanged() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let source = generate(&mut rng, 8);
        assert!(max_depth(&source) <= 8);

        let document = RawDocument::from_json(&source);
        let normalized = normalize(&document).expect("acyclic document normalizes");
        assert_eq!(normalized, source);
    }
}

#[test]
fn normalization_is_idempotent() {
    let mut rng = Lcg(99);
    for _ in 0..100 {
        let source = generate(&mut rng, 8);
        let once = normalize(&RawDocument::from_json(&source)).expect("first pass");
        let twice = normalize(&RawDocument::from_json(&once)).expect("second pass");
        assert_eq!(once, twice);
    }

    let document = domain_document();
    let once = normalize(&document).expect("first pass");
    let twice = normalize(&RawDocument::from_json(&once)).expect("second pass");
    assert_eq!(once, twice);
}

/// Document mixing every node variant, shaped like a summary entry.
fn domain_document() -> RawDocument {
    let mut builder = RawBuilder::new();

    let id = builder.scalar(ScalarValue::string("mp-149"));
    let formula = builder.scalar(ScalarValue::string("Si"));
    let lattice = builder.push(RawNode::ArrayLike(NumericArray::new(
        vec![2, 2],
        vec![3.8, 0.0, 0.0, 3.8],
    )));

    let value = builder.scalar(ScalarValue::string("Cubic"));
    let name = builder.scalar(ScalarValue::string("cubic"));
    let crystal_system = builder.push(RawNode::FieldObject {
        type_name: "CrystalSystem".to_string(),
        fields: vec![("_value_".to_string(), value), ("_name_".to_string(), name)],
    });
    let symbol = builder.scalar(ScalarValue::string("Fd-3m"));
    let number = builder.scalar(ScalarValue::integer(227));
    let symmetry = builder.push(RawNode::DictLike {
        type_name: "SymmetryData".to_string(),
        entries: vec![
            ("symbol".to_string(), symbol),
            ("number".to_string(), number),
            ("crystal_system".to_string(), crystal_system),
        ],
    });
    let origin = builder.push(RawNode::Opaque("<Database.MP>".to_string()));

    let root = builder.push(RawNode::Mapping(vec![
        (ScalarValue::string("material_id"), id),
        (ScalarValue::string("formula_pretty"), formula),
        (ScalarValue::string("lattice"), lattice),
        (ScalarValue::string("symmetry"), symmetry),
        (ScalarValue::string("origin"), origin),
    ]));
    builder.finish(root)
}

#[test]
fn every_variant_maps_to_json() {
    let normalized = normalize(&domain_document()).expect("document normalizes");

    assert_eq!(
        normalized,
        json!({
            "material_id": "mp-149",
            "formula_pretty": "Si",
            "lattice": [[3.8, 0.0], [0.0, 3.8]],
            "symmetry": {
                "symbol": "Fd-3m",
                "number": 227,
                "crystal_system": {"_value_": "Cubic", "_name_": "cubic"}
            },
            "origin": "<Database.MP>"
        })
    );

    let keys: Vec<&String> = normalized.as_object().expect("mapping").keys().collect();
    assert_eq!(
        keys,
        ["material_id", "formula_pretty", "lattice", "symmetry", "origin"]
    );
}

#[test]
fn mapping_keys_are_coerced_to_strings() {
    let mut builder = RawBuilder::new();
    let a = builder.scalar(ScalarValue::string("a"));
    let b = builder.scalar(ScalarValue::string("b"));
    let c = builder.scalar(ScalarValue::string("c"));
    let d = builder.scalar(ScalarValue::string("d"));
    let root = builder.push(RawNode::Mapping(vec![
        (ScalarValue::Boolean(true), a),
        (ScalarValue::integer(26), b),
        (ScalarValue::Null, c),
        (ScalarValue::float(1.5), d),
    ]));

    let normalized = normalize(&builder.finish(root)).expect("mapping normalizes");
    assert_eq!(
        normalized,
        json!({"True": "a", "26": "b", "None": "c", "1.5": "d"})
    );
}

#[test]
fn non_finite_numbers_become_null() {
    let mut builder = RawBuilder::new();
    let nan = builder.scalar(ScalarValue::float(f64::NAN));
    let array = builder.push(RawNode::ArrayLike(NumericArray::vector(vec![
        1.0,
        f64::INFINITY,
    ])));
    let root = builder.push(RawNode::Sequence(vec![nan, array]));

    let normalized = normalize(&builder.finish(root)).expect("sequence normalizes");
    assert_eq!(normalized, json!([null, [1.0, null]]));
}

#[test]
fn mismatched_array_shape_is_unrepresentable() {
    let mut builder = RawBuilder::new();
    let array = builder.push(RawNode::ArrayLike(NumericArray::new(
        vec![2, 3],
        vec![1.0, 2.0],
    )));
    let root = builder.push(RawNode::Mapping(vec![(ScalarValue::string("matrix"), array)]));

    let error = normalize(&builder.finish(root)).expect_err("shape mismatch rejected");
    match error {
        ToolError::Unrepresentable { path, .. } => assert_eq!(path, "$.matrix"),
        other => panic!("unexpected error: {other}"),
    }
}

fn array_document(array: NumericArray) -> RawDocument {
    let mut builder = RawBuilder::new();
    let node = builder.push(RawNode::ArrayLike(array));
    let root = builder.push(RawNode::Mapping(vec![(ScalarValue::string("lattice"), node)]));
    builder.finish(root)
}

#[test]
fn overflowing_array_shape_is_unrepresentable() {
    let document = array_document(NumericArray::new(vec![usize::MAX, 2], vec![]));

    let error = normalize(&document).expect_err("overflowing shape rejected");
    match error {
        ToolError::Unrepresentable { path, .. } => assert_eq!(path, "$.lattice"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_array_with_huge_leading_dimension_is_unrepresentable() {
    let document = array_document(NumericArray::new(vec![1 << 28, 0], vec![]));
    let error = normalize(&document).expect_err("oversized shape rejected");
    assert!(matches!(error, ToolError::Unrepresentable { .. }));

    let document = array_document(NumericArray::new(vec![usize::MAX, 0], vec![]));
    let error = normalize(&document).expect_err("oversized shape rejected");
    assert!(matches!(error, ToolError::Unrepresentable { .. }));
}

#[test]
fn empty_arrays_within_the_container_limit_normalize() {
    let document = array_document(NumericArray::new(vec![3, 0], vec![]));
    let normalized = normalize(&document).expect("small empty array normalizes");
    assert_eq!(normalized, json!({"lattice": [[], [], []]}));

    let at_limit = array_document(NumericArray::new(vec![MAX_ARRAY_CONTAINERS - 1, 0], vec![]));
    let normalized = normalize(&at_limit).expect("array at the limit normalizes");
    assert_eq!(
        normalized["lattice"].as_array().map(Vec::len),
        Some(MAX_ARRAY_CONTAINERS - 1)
    );
}

#[test]
fn self_referential_document_is_rejected() {
    let mut builder = RawBuilder::new();
    let root = builder.reserve();
    let label = builder.scalar(ScalarValue::string("loop"));
    builder.set(root, RawNode::Sequence(vec![label, root]));

    let error = normalize(&builder.finish(root)).expect_err("cycle detected");
    assert!(matches!(error, ToolError::CyclicStructure { .. }));
}

#[test]
fn indirect_cycle_reports_its_path() {
    let mut builder = RawBuilder::new();
    let parent = builder.reserve();
    let child = builder.push(RawNode::FieldObject {
        type_name: "Site".to_string(),
        fields: vec![("parent".to_string(), parent)],
    });
    builder.set(
        parent,
        RawNode::DictLike {
            type_name: "Structure".to_string(),
            entries: vec![("sites".to_string(), child)],
        },
    );

    let error = normalize(&builder.finish(parent)).expect_err("cycle detected");
    match error {
        ToolError::CyclicStructure { path } => assert_eq!(path, "$.sites.parent"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn shared_nodes_are_not_cycles() {
    let mut builder = RawBuilder::new();
    let symbol = builder.scalar(ScalarValue::string("O"));
    let shared = builder.push(RawNode::Sequence(vec![symbol]));
    let root = builder.push(RawNode::Mapping(vec![
        (ScalarValue::string("left"), shared),
        (ScalarValue::string("right"), shared),
    ]));

    let normalized = normalize(&builder.finish(root)).expect("shared node normalizes");
    assert_eq!(normalized, json!({"left": ["O"], "right": ["O"]}));
}

#[test]
fn nesting_beyond_the_limit_is_rejected() {
    let mut builder = RawBuilder::new();
    let mut current = builder.scalar(ScalarValue::Null);
    for _ in 0..MAX_DEPTH + 5 {
        current = builder.push(RawNode::Sequence(vec![current]));
    }

    let error = normalize(&builder.finish(current)).expect_err("depth limit enforced");
    assert!(matches!(error, ToolError::DepthExceeded { limit, .. } if limit == MAX_DEPTH));
}

#[test]
fn dangling_reference_is_unrepresentable() {
    let mut other = RawBuilder::new();
    let foreign = (0..5)
        .map(|_| other.scalar(ScalarValue::Null))
        .last()
        .expect("ids allocated");

    let mut builder = RawBuilder::new();
    let root = builder.push(RawNode::Sequence(vec![foreign]));

    let error = normalize(&builder.finish(root)).expect_err("dangling id rejected");
    assert!(matches!(error, ToolError::Unrepresentable { .. }));
}
