//! Conversion of raw documents into JSON-safe trees.
//!
//! Every node variant of [`RawNode`] has exactly one conversion rule, so the
//! function is total over acyclic documents within [`MAX_DEPTH`]. Cycles are
//! detected by tracking the node ids on the current path; a node reachable
//! through two different parents is converted twice, which is not a cycle.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::materials::tools::error::{Result, ToolError};
use crate::materials::tools::model::{NodeId, NumericArray, RawDocument, RawNode, ScalarValue};

/// Maximum container nesting accepted before normalization gives up.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of lists a single numeric array may expand into.
pub const MAX_ARRAY_CONTAINERS: usize = 1 << 20;

/// Converts a raw document into a JSON-safe value tree.
pub fn normalize(document: &RawDocument) -> Result<Value> {
    let mut walker = Walker {
        document,
        on_path: HashSet::new(),
        segments: Vec::new(),
    };
    walker.visit(document.root(), 0)
}

enum Segment {
    Key(String),
    Index(usize),
}

struct Walker<'a> {
    document: &'a RawDocument,
    on_path: HashSet<NodeId>,
    segments: Vec<Segment>,
}

impl Walker<'_> {
    fn visit(&mut self, id: NodeId, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(ToolError::DepthExceeded {
                limit: MAX_DEPTH,
                path: self.path(),
            });
        }

        let document = self.document;
        let node = document
            .node(id)
            .ok_or_else(|| ToolError::Unrepresentable {
                path: self.path(),
                reason: format!("dangling node reference #{}", id.index()),
            })?;

        match node {
            RawNode::Scalar(scalar) => Ok(scalar.to_json()),
            RawNode::ArrayLike(array) => self.array_to_json(array),
            RawNode::Opaque(text) => Ok(Value::String(text.clone())),
            RawNode::Sequence(items) => {
                self.guarded(id, |walker| walker.visit_sequence(items, depth))
            }
            RawNode::Mapping(entries) => {
                let keyed: Vec<(String, NodeId)> = entries
                    .iter()
                    .map(|(key, child)| (key.to_key(), *child))
                    .collect();
                self.guarded(id, |walker| walker.visit_entries(&keyed, depth))
            }
            RawNode::DictLike { entries, .. } => {
                self.guarded(id, |walker| walker.visit_entries(entries, depth))
            }
            RawNode::FieldObject { fields, .. } => {
                self.guarded(id, |walker| walker.visit_entries(fields, depth))
            }
        }
    }

    /// Runs `convert` with `id` marked as an ancestor of everything below it.
    fn guarded(
        &mut self,
        id: NodeId,
        convert: impl FnOnce(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        if !self.on_path.insert(id) {
            return Err(ToolError::CyclicStructure { path: self.path() });
        }
        let value = convert(self)?;
        self.on_path.remove(&id);
        Ok(value)
    }

    fn visit_sequence(&mut self, items: &[NodeId], depth: usize) -> Result<Value> {
        let mut values = Vec::with_capacity(items.len());
        for (index, child) in items.iter().enumerate() {
            self.segments.push(Segment::Index(index));
            values.push(self.visit(*child, depth + 1)?);
            self.segments.pop();
        }
        Ok(Value::Array(values))
    }

    fn visit_entries(&mut self, entries: &[(String, NodeId)], depth: usize) -> Result<Value> {
        let mut map = Map::with_capacity(entries.len());
        for (key, child) in entries {
            self.segments.push(Segment::Key(key.clone()));
            let value = self.visit(*child, depth + 1)?;
            self.segments.pop();
            map.insert(key.clone(), value);
        }
        Ok(Value::Object(map))
    }

    fn array_to_json(&self, array: &NumericArray) -> Result<Value> {
        let unrepresentable = |reason: String| ToolError::Unrepresentable {
            path: self.path(),
            reason,
        };

        let expected = array
            .shape
            .iter()
            .try_fold(1usize, |count, dim| count.checked_mul(*dim))
            .ok_or_else(|| {
                unrepresentable(format!("array shape {:?} overflows", array.shape))
            })?;
        if expected != array.data.len() {
            return Err(unrepresentable(format!(
                "array shape {:?} needs {expected} values, found {}",
                array.shape,
                array.data.len()
            )));
        }

        match container_count(&array.shape) {
            Some(containers) if containers <= MAX_ARRAY_CONTAINERS => {
                Ok(nest(&array.shape, &array.data))
            }
            _ => Err(unrepresentable(format!(
                "array shape {:?} needs more than {MAX_ARRAY_CONTAINERS} nested lists",
                array.shape
            ))),
        }
    }

    fn path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => {
                    let _ = write!(path, ".{key}");
                }
                Segment::Index(index) => {
                    let _ = write!(path, "[{index}]");
                }
            }
        }
        path
    }
}

/// Lists `nest` creates for `shape`: one per index prefix, stopping below the
/// first zero dimension. `None` on overflow.
fn container_count(shape: &[usize]) -> Option<usize> {
    let mut total = 0usize;
    let mut level = 1usize;
    for dim in shape {
        total = total.checked_add(level)?;
        level = level.checked_mul(*dim)?;
    }
    Some(total)
}

fn nest(shape: &[usize], data: &[f64]) -> Value {
    match shape.split_first() {
        None => data
            .first()
            .map(|value| ScalarValue::float(*value).to_json())
            .unwrap_or(Value::Null),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            let items = (0..len)
                .map(|index| nest(rest, &data[index * stride..(index + 1) * stride]))
                .collect();
            Value::Array(items)
        }
    }
}
