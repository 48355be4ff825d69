use serde_json::{Number, Value};

/// Index of a node inside a [`RawDocument`] arena. Two references to the same
/// object share the same id, which is what the normalizer keys identity on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Represents a scalar leaf in a raw document.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Explicit `null`.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer or finite floating point literal.
    Number(Number),
    /// Plain string literal.
    String(String),
}

impl ScalarValue {
    /// Builds a numeric scalar. Non-finite floats have no JSON form and
    /// collapse to [`ScalarValue::Null`].
    pub fn float(value: f64) -> Self {
        Number::from_f64(value)
            .map(ScalarValue::Number)
            .unwrap_or(ScalarValue::Null)
    }

    pub fn integer(value: i64) -> Self {
        ScalarValue::Number(Number::from(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        ScalarValue::String(value.into())
    }

    /// Converts the scalar into its JSON representation.
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Null => Value::Null,
            ScalarValue::Boolean(value) => Value::Bool(*value),
            ScalarValue::Number(value) => Value::Number(value.clone()),
            ScalarValue::String(value) => Value::String(value.clone()),
        }
    }

    /// Text used when the scalar appears as a mapping key.
    pub fn to_key(&self) -> String {
        match self {
            ScalarValue::Null => "None".to_string(),
            ScalarValue::Boolean(true) => "True".to_string(),
            ScalarValue::Boolean(false) => "False".to_string(),
            ScalarValue::Number(value) => value.to_string(),
            ScalarValue::String(value) => value.clone(),
        }
    }
}

/// Dense numeric array with a row-major shape, e.g. a lattice matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NumericArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self { shape, data }
    }

    /// One-dimensional array over `data`.
    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }
}

/// The closed set of shapes a raw document node can take.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    /// Null, boolean, number, or string.
    Scalar(ScalarValue),
    /// Ordered list or tuple.
    Sequence(Vec<NodeId>),
    /// Ordered mapping with scalar keys.
    Mapping(Vec<(ScalarValue, NodeId)>),
    /// Value that converts to nested lists of numbers.
    ArrayLike(NumericArray),
    /// Domain value object exposing a mapping form.
    DictLike {
        type_name: String,
        entries: Vec<(String, NodeId)>,
    },
    /// Generic object exposing only its named fields.
    FieldObject {
        type_name: String,
        fields: Vec<(String, NodeId)>,
    },
    /// Anything else, carried as its textual representation.
    Opaque(String),
}

/// One raw entity as handed over by the retrieval layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    nodes: Vec<RawNode>,
    root: NodeId,
}

impl RawDocument {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node; `None` for ids that do not belong to this arena.
    pub fn node(&self, id: NodeId) -> Option<&RawNode> {
        self.nodes.get(id.0)
    }

    /// Adapts a JSON payload into the raw node set.
    ///
    /// Arrays become sequences; objects carrying a `@class` marker are value
    /// objects serialised through their mapping form and become
    /// [`RawNode::DictLike`]; every other object is a plain mapping.
    pub fn from_json(value: &Value) -> Self {
        let mut builder = RawBuilder::new();
        let root = builder.push_json(value);
        builder.finish(root)
    }
}

/// Incrementally assembles a [`RawDocument`].
///
/// Nodes may reference ids that are filled in later through
/// [`RawBuilder::reserve`] and [`RawBuilder::set`], which is how shared and
/// self-referential structures are expressed.
#[derive(Debug, Default)]
pub struct RawBuilder {
    nodes: Vec<RawNode>,
}

impl RawBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, node: RawNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn scalar(&mut self, value: ScalarValue) -> NodeId {
        self.push(RawNode::Scalar(value))
    }

    /// Allocates a placeholder node to be replaced with [`RawBuilder::set`].
    pub fn reserve(&mut self) -> NodeId {
        self.push(RawNode::Scalar(ScalarValue::Null))
    }

    /// Replaces the node stored under `id`.
    pub fn set(&mut self, id: NodeId, node: RawNode) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = node;
        }
    }

    /// Recursively appends a JSON value. See [`RawDocument::from_json`].
    pub fn push_json(&mut self, value: &Value) -> NodeId {
        match value {
            Value::Null => self.scalar(ScalarValue::Null),
            Value::Bool(flag) => self.scalar(ScalarValue::Boolean(*flag)),
            Value::Number(number) => self.scalar(ScalarValue::Number(number.clone())),
            Value::String(text) => self.scalar(ScalarValue::String(text.clone())),
            Value::Array(items) => {
                let children = items.iter().map(|item| self.push_json(item)).collect();
                self.push(RawNode::Sequence(children))
            }
            Value::Object(map) => {
                let class = map.get("@class").and_then(Value::as_str).map(str::to_string);
                let entries: Vec<(String, NodeId)> = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.push_json(item)))
                    .collect();
                match class {
                    Some(type_name) => self.push(RawNode::DictLike { type_name, entries }),
                    None => self.push(RawNode::Mapping(
                        entries
                            .into_iter()
                            .map(|(key, id)| (ScalarValue::String(key), id))
                            .collect(),
                    )),
                }
            }
        }
    }

    pub fn finish(self, root: NodeId) -> RawDocument {
        RawDocument {
            nodes: self.nodes,
            root,
        }
    }
}
