//! The fixed benchmark queries, written against the SQLite property-graph layout.
//!
//! Every caller-supplied value goes in as a bind parameter. Property lookups are
//! spelled `json_extract(<alias>.props, '$.<property>')` so they match the
//! expression indexes created by the loader.

use crate::store::Query;

pub const PERSON: &str = "Person";
pub const LINK: &str = "link";
pub const USERNAME: &str = "username";
pub const SET_DATE: &str = "setDate";
pub const LINK_SOURCE: &str = "manual";

/// Creates one `link` edge between two persons matched by username.
pub fn create_link(graph: &str, src: &str, dst: &str, created_at: i64) -> Query {
    Query::new(
        "INSERT INTO edges (graph, relation, src, dst, props)
         SELECT :graph, :relation, r.id, c.id,
                json_object('createdAt', :created_at, 'src', :source)
         FROM nodes r, nodes c
         WHERE r.graph = :graph AND r.label = :label
           AND json_extract(r.props, '$.username') = :src
           AND c.graph = :graph AND c.label = :label
           AND json_extract(c.props, '$.username') = :dst",
    )
    .bind("graph", graph)
    .bind("relation", LINK)
    .bind("label", PERSON)
    .bind("created_at", created_at)
    .bind("source", LINK_SOURCE)
    .bind("src", src)
    .bind("dst", dst)
}

/// Number of outgoing links per person that has any.
pub fn link_counts(graph: &str) -> Query {
    Query::new(
        "SELECT json_extract(r.props, '$.username') AS username, COUNT(e.id) AS links
         FROM edges e
         JOIN nodes r ON r.id = e.src
         WHERE e.graph = :graph AND e.relation = :relation AND r.label = :label
         GROUP BY e.src
         ORDER BY username",
    )
    .bind("graph", graph)
    .bind("relation", LINK)
    .bind("label", PERSON)
}

/// Every person `username` links to.
pub fn connections_of(graph: &str, username: &str) -> Query {
    Query::new(
        "SELECT json_extract(r.props, '$.username') AS username,
                json_extract(c.props, '$.username') AS target,
                json_extract(c.props, '$.name') AS name,
                json_extract(c.props, '$.setDate') AS set_date
         FROM nodes r
         JOIN edges e ON e.graph = r.graph AND e.relation = :relation AND e.src = r.id
         JOIN nodes c ON c.id = e.dst
         WHERE r.graph = :graph AND r.label = :label
           AND json_extract(r.props, '$.username') = :username
         ORDER BY target",
    )
    .bind("graph", graph)
    .bind("relation", LINK)
    .bind("label", PERSON)
    .bind("username", username)
}

/// Targets of `username` whose set date is set and earlier than `today`.
pub fn dated_links_of(graph: &str, username: &str, today: i64) -> Query {
    Query::new(
        "SELECT json_extract(r.props, '$.username') AS username,
                json_extract(c.props, '$.username') AS target,
                json_extract(c.props, '$.name') AS name,
                json_extract(c.props, '$.setDate') AS set_date,
                json_extract(c.props, '$.updatedAt') AS updated_at
         FROM nodes r
         JOIN edges e ON e.graph = r.graph AND e.relation = :relation AND e.src = r.id
         JOIN nodes c ON c.id = e.dst
         WHERE r.graph = :graph AND r.label = :label
           AND json_extract(r.props, '$.username') = :username
           AND json_extract(c.props, '$.setDate') > 0
           AND json_extract(c.props, '$.setDate') < :today
         ORDER BY username, target, set_date",
    )
    .bind("graph", graph)
    .bind("relation", LINK)
    .bind("label", PERSON)
    .bind("username", username)
    .bind("today", today)
}

/// All persons with their class attributes.
pub fn all_persons(graph: &str) -> Query {
    Query::new(
        "SELECT json_extract(props, '$.username') AS username,
                json_extract(props, '$.name') AS name,
                json_extract(props, '$.company') AS company,
                json_extract(props, '$.setDate') AS set_date
         FROM nodes
         WHERE graph = :graph AND label = :label
         ORDER BY id",
    )
    .bind("graph", graph)
    .bind("label", PERSON)
}
