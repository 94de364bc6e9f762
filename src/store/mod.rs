//! Property-graph store abstraction used by the loader and the benchmark queries.
//!
//! Writes are staged with [`GraphStore::add_node`] / [`GraphStore::add_edge`] and
//! become visible only after [`GraphStore::commit`]. Reads go through
//! [`GraphStore::query`] with named bind parameters.

pub mod bulk;
pub mod sqlite;

use serde_json::{Map, Value as Json};
use std::fmt;

pub use bulk::BulkMode;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("graph {0:?} does not exist")]
    GraphNotFound(String),
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("properties must serialize to a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Properties = Map<String, Json>;

/// A node waiting to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub properties: Properties,
}

impl Node {
    pub fn new(label: impl Into<String>, properties: Properties) -> Self {
        Self {
            label: label.into(),
            properties,
        }
    }

    /// Builds a node from anything that serializes to a JSON object.
    pub fn from_serialize<T: serde::Serialize>(
        label: impl Into<String>,
        value: &T,
    ) -> Result<Self, StoreError> {
        match serde_json::to_value(value)? {
            Json::Object(properties) => Ok(Self::new(label, properties)),
            _ => Err(StoreError::NotAnObject),
        }
    }
}

/// An edge waiting to be committed. Both ends are matched by a key property
/// on nodes with the given label.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub relation: String,
    pub label: String,
    pub key: String,
    pub src: String,
    pub dst: String,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Query text plus named parameters. Names are stored with their `:` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub params: Vec<(String, Value)>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.push((format!(":{name}"), value.into()));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Off,
    Normal,
    Full,
    Extra,
}

pub trait GraphStore {
    /// Name of the graph this handle writes to.
    fn graph(&self) -> &str;

    /// Removes every node and edge of graph `name`. Fails with
    /// [`StoreError::GraphNotFound`] when nothing by that name was ever committed.
    fn delete_graph(&mut self, name: &str) -> Result<(), StoreError>;

    fn add_node(&mut self, node: Node);

    fn add_edge(&mut self, edge: Edge);

    /// Number of staged, uncommitted writes.
    fn pending(&self) -> usize;

    /// Flushes staged writes as a single unit and clears the staging buffers.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Creates an index on `property` of nodes labelled `label`. Idempotent.
    fn create_index(&mut self, label: &str, property: &str) -> Result<(), StoreError>;

    fn query(&mut self, query: &Query) -> Result<ResultSet, StoreError>;

    /// Diagnostic counters, for display only.
    fn info(&mut self) -> Result<Vec<(String, i64)>, StoreError>;

    fn durability(&mut self) -> Result<Durability, StoreError>;

    fn set_durability(&mut self, durability: Durability) -> Result<(), StoreError>;
}

/// Accepts names usable as labels or property keys: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn check_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_identifiers() {
        assert!(check_identifier("Person").is_ok());
        assert!(check_identifier("setDate").is_ok());
        assert!(check_identifier("_x1").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("1abc").is_err());
        assert!(check_identifier("user name").is_err());
        assert!(check_identifier("x');DROP").is_err());
    }

    #[test]
    fn test_bind_prefixes_names() {
        let q = Query::new("SELECT :a").bind("a", 1i64).bind("b", "two");

        assert_eq!(
            vec![
                (":a".to_string(), Value::Int(1)),
                (":b".to_string(), Value::Text("two".into()))
            ],
            q.params
        );
    }

    #[test]
    fn test_node_from_struct() {
        #[derive(Serialize)]
        struct P {
            username: &'static str,
            age: i64,
        }

        let node = Node::from_serialize("Person", &P { username: "x", age: 3 }).unwrap();
        assert_eq!("Person", node.label);
        assert_eq!(Some(&Json::from("x")), node.properties.get("username"));
        assert_eq!(Some(&Json::from(3)), node.properties.get("age"));
    }

    #[test]
    fn test_node_from_scalar_is_rejected() {
        assert!(matches!(
            Node::from_serialize("Person", &5),
            Err(StoreError::NotAnObject)
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!("NULL", Value::Null.to_string());
        assert_eq!("42", Value::Int(42).to_string());
        assert_eq!("ann", Value::from("ann").to_string());
    }
}
