//! SQLite-backed property graph.
//!
//! Nodes and edges live in two shared tables, keyed by graph name, with their
//! properties kept as JSON text. Property indexes are expression indexes on
//! `json_extract(props, '$.<property>')`, so queries must spell the lookup the
//! same way to hit them.

use super::{
    Durability, Edge, GraphStore, Node, Query, ResultSet, StoreError, Value, check_identifier,
};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, Transaction, named_params, params};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS graphs (
        name TEXT PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS nodes (
        id    INTEGER PRIMARY KEY,
        graph TEXT NOT NULL,
        label TEXT NOT NULL,
        props TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS edges (
        id       INTEGER PRIMARY KEY,
        graph    TEXT NOT NULL,
        relation TEXT NOT NULL,
        src      INTEGER NOT NULL,
        dst      INTEGER NOT NULL,
        props    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS edges_by_src ON edges (graph, relation, src);
    CREATE INDEX IF NOT EXISTS nodes_by_label ON nodes (graph, label);
";

pub struct SqliteStore {
    conn: Connection,
    graph: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    commits: u64,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, graph: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::from_connection(conn, graph)
    }

    pub fn open_in_memory(graph: &str) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, graph)
    }

    pub fn from_connection(conn: Connection, graph: &str) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            graph: graph.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            commits: 0,
        })
    }

    /// Number of non-empty commits issued through this handle.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn insert_edge(tx: &Transaction<'_>, graph: &str, edge: &Edge) -> Result<usize, StoreError> {
        let key = check_identifier(&edge.key)?;
        let sql = format!(
            "INSERT INTO edges (graph, relation, src, dst, props)
             SELECT :graph, :relation, r.id, c.id, :props
             FROM nodes r, nodes c
             WHERE r.graph = :graph AND r.label = :label AND json_extract(r.props, '$.{key}') = :src
               AND c.graph = :graph AND c.label = :label AND json_extract(c.props, '$.{key}') = :dst"
        );
        let props = serde_json::to_string(&edge.properties)?;
        let mut stmt = tx.prepare_cached(&sql)?;
        Ok(stmt.execute(named_params! {
            ":graph": graph,
            ":relation": edge.relation,
            ":props": props,
            ":label": edge.label,
            ":src": edge.src,
            ":dst": edge.dst,
        })?)
    }

    fn count(&self, sql: &str) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(sql, [&self.graph], |row| row.get(0))?)
    }

    fn pragma(&self, name: &str) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row(&format!("PRAGMA {name}"), [], |row| row.get(0))?)
    }
}

impl GraphStore for SqliteStore {
    fn graph(&self) -> &str {
        &self.graph
    }

    fn delete_graph(&mut self, name: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        if tx.execute("DELETE FROM graphs WHERE name = ?1", [name])? == 0 {
            return Err(StoreError::GraphNotFound(name.to_string()));
        }
        let edges = tx.execute("DELETE FROM edges WHERE graph = ?1", [name])?;
        let nodes = tx.execute("DELETE FROM nodes WHERE graph = ?1", [name])?;
        tx.commit()?;
        debug!(graph = name, nodes, edges, "graph deleted");
        Ok(())
    }

    fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    fn pending(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.pending() == 0 {
            return Ok(());
        }
        let nodes = std::mem::take(&mut self.nodes);
        let edges = std::mem::take(&mut self.edges);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO graphs (name) VALUES (?1)",
            [&self.graph],
        )?;
        {
            let mut insert =
                tx.prepare_cached("INSERT INTO nodes (graph, label, props) VALUES (?1, ?2, ?3)")?;
            for node in &nodes {
                let props = serde_json::to_string(&node.properties)?;
                insert.execute(params![self.graph, node.label, props])?;
            }
        }
        let mut linked = 0;
        for edge in &edges {
            linked += Self::insert_edge(&tx, &self.graph, edge)?;
        }
        tx.commit()?;

        self.commits += 1;
        debug!(
            graph = %self.graph,
            nodes = nodes.len(),
            edges = linked,
            "batch committed"
        );
        Ok(())
    }

    fn create_index(&mut self, label: &str, property: &str) -> Result<(), StoreError> {
        let label = check_identifier(label)?;
        let property = check_identifier(property)?;
        self.conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{label}_{property}
             ON nodes (graph, label, json_extract(props, '$.{property}'))"
        ))?;
        Ok(())
    }

    fn query(&mut self, query: &Query) -> Result<ResultSet, StoreError> {
        let mut stmt = self.conn.prepare_cached(&query.text)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let params: Vec<(&str, &dyn ToSql)> = query
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();

        let mut rows = stmt.query(params.as_slice())?;
        let mut result = ResultSet {
            columns,
            rows: Vec::new(),
        };
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(result.columns.len());
            for i in 0..result.columns.len() {
                values.push(Value::from(row.get_ref(i)?));
            }
            result.rows.push(values);
        }
        Ok(result)
    }

    fn info(&mut self) -> Result<Vec<(String, i64)>, StoreError> {
        let page_count = self.pragma("page_count")?;
        let page_size = self.pragma("page_size")?;
        Ok(vec![
            ("page_count".to_string(), page_count),
            ("page_size".to_string(), page_size),
            ("freelist_count".to_string(), self.pragma("freelist_count")?),
            ("used_bytes".to_string(), page_count * page_size),
            (
                "nodes".to_string(),
                self.count("SELECT COUNT(*) FROM nodes WHERE graph = ?1")?,
            ),
            (
                "edges".to_string(),
                self.count("SELECT COUNT(*) FROM edges WHERE graph = ?1")?,
            ),
            ("commits".to_string(), self.commits as i64),
        ])
    }

    fn durability(&mut self) -> Result<Durability, StoreError> {
        Ok(match self.pragma("synchronous")? {
            0 => Durability::Off,
            1 => Durability::Normal,
            3 => Durability::Extra,
            _ => Durability::Full,
        })
    }

    fn set_durability(&mut self, durability: Durability) -> Result<(), StoreError> {
        let level: i64 = match durability {
            Durability::Off => 0,
            Durability::Normal => 1,
            Durability::Full => 2,
            Durability::Extra => 3,
        };
        self.conn.pragma_update(None, "synchronous", level)?;
        Ok(())
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::from(rusqlite::types::Null),
            Value::Int(v) => ToSqlOutput::from(*v),
            Value::Real(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Int(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Value::Text(format!("<{} bytes>", v.len())),
        }
    }
}
