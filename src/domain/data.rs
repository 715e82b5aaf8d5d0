//! Raw tree records as delivered by the data source

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};

/// Opaque node identifier: numeric or textual, exactly as it arrives in the data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(n) => write!(f, "{}", n),
            NodeKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl NodeKey {
    /// Whether both keys name the same node.
    ///
    /// Keys of different kinds compare by their text, so `Int(7)` matches
    /// `Text("7")` but not `Text("007")`.
    pub fn same_id(&self, other: &NodeKey) -> bool {
        match (self, other) {
            (NodeKey::Int(a), NodeKey::Int(b)) => a == b,
            (NodeKey::Text(a), NodeKey::Text(b)) => a == b,
            (NodeKey::Int(n), NodeKey::Text(s)) | (NodeKey::Text(s), NodeKey::Int(n)) => {
                *s == n.to_string()
            }
        }
    }
}

/// Keys typed on the command line stay text verbatim; [`NodeKey::same_id`]
/// lets them reach numeric ids too.
impl FromStr for NodeKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NodeKey::Text(s.to_string()))
    }
}

impl From<i64> for NodeKey {
    fn from(n: i64) -> Self {
        NodeKey::Int(n)
    }
}

impl From<i32> for NodeKey {
    fn from(n: i32) -> Self {
        NodeKey::Int(i64::from(n))
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::Text(s.to_string())
    }
}

/// Child-index path from the document root to a record. The root is the empty path.
pub type DataPath = Vec<usize>;

/// One entry of the navigation tree.
///
/// Decoding is lenient per field: a malformed id becomes `None` (never
/// selectable), a null or non-text title or sub-level becomes text or empty,
/// and non-array children make the record a leaf. Only a document that is not
/// an object at all fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeData {
    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<NodeKey>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, alias = "subLevel", deserialize_with = "lenient_text")]
    pub sub_level: String,
    #[serde(
        default,
        deserialize_with = "lenient_children",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<Vec<TreeNodeData>>,
}

/// Integers that fit `i64` and strings; floats, booleans and the rest drop to `None`.
fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeKey>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().map(NodeKey::Int),
        Value::String(s) => Some(NodeKey::Text(s)),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Entries that are not records are skipped.
fn lenient_children<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<TreeNodeData>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(_) => serde_json::from_value(item).ok(),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Stand-in for records that cannot be resolved: no id, no children.
pub(crate) static EMPTY_RECORD: TreeNodeData = TreeNodeData {
    id: None,
    title: String::new(),
    sub_level: String::new(),
    children: None,
};

impl TreeNodeData {
    pub fn new(id: impl Into<NodeKey>, sub_level: &str, title: &str) -> Self {
        Self {
            id: Some(id.into()),
            title: title.to_string(),
            sub_level: sub_level.to_string(),
            children: None,
        }
    }

    /// Wrapper record for the synthetic root.
    pub fn root(children: Vec<TreeNodeData>) -> Self {
        Self {
            children: Some(children),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNodeData>) -> Self {
        self.children = Some(children);
        self
    }

    /// Decode a document. The top level must be a JSON object.
    pub fn from_json(content: &str) -> DomainResult<Self> {
        let invalid = |message: String| DomainError::InvalidTreeData { message };
        match serde_json::from_str::<Value>(content).map_err(|e| invalid(e.to_string()))? {
            value @ Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
            }
            _ => Err(invalid("expected a JSON object at the top level".into())),
        }
    }

    /// Children in data order; absent and empty look the same.
    pub fn child_records(&self) -> &[TreeNodeData] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.child_records().is_empty()
    }

    pub fn resolve(&self, path: &[usize]) -> Option<&TreeNodeData> {
        path.iter()
            .try_fold(self, |node, &i| node.child_records().get(i))
    }

    pub fn resolve_mut(&mut self, path: &[usize]) -> Option<&mut TreeNodeData> {
        let mut node = self;
        for &i in path {
            node = node.children.as_mut()?.get_mut(i)?;
        }
        Some(node)
    }

    /// Path of the first record (pre-order, data order) carrying `key`.
    pub fn find_path(&self, key: &NodeKey) -> Option<DataPath> {
        let mut stack: Vec<(DataPath, &TreeNodeData)> = vec![(Vec::new(), self)];
        while let Some((path, node)) = stack.pop() {
            if node.id.as_ref().is_some_and(|id| id.same_id(key)) {
                return Some(path);
            }
            for (i, child) in node.child_records().iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child_path, child));
            }
        }
        None
    }

    /// All records in pre-order with their depth, the root included.
    pub fn walk(&self) -> Vec<(usize, &TreeNodeData)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.child_records().iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}
