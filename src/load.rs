use crate::bench::Phase;
use crate::config::EdgeMode;
use crate::core::plan::LinkPlan;
use crate::generate::persons::Person;
use crate::progress::ProgressSink;
use crate::queries::{self, LINK, LINK_SOURCE, PERSON, SET_DATE, USERNAME};
use crate::store::{Edge, GraphStore, Node, Properties, StoreError};
use tracing::{debug, info};

const PROGRESS_STEP: u64 = 128;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub written: u64,
    pub commits: u64,
}

/// Deletes graph `name` if it exists. A missing graph is not an error.
/// Returns whether anything was deleted.
pub fn reset_graph<S: GraphStore + ?Sized>(store: &mut S, name: &str) -> Result<bool, StoreError> {
    match store.delete_graph(name) {
        Ok(()) => {
            info!(graph = name, "deleted existing graph");
            Ok(true)
        }
        Err(StoreError::GraphNotFound(_)) => {
            debug!(graph = name, "no existing graph to delete");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Stages persons as `Person` nodes, committing every `batch_size` of them and
/// once more for a trailing partial batch. At most `batch_size` nodes are ever
/// held by the store between commits.
pub fn load_persons<S, I, P>(
    store: &mut S,
    persons: I,
    batch_size: usize,
    progress: &mut P,
) -> Result<LoadStats, StoreError>
where
    S: GraphStore + ?Sized,
    I: IntoIterator<Item = Person>,
    P: ProgressSink + ?Sized,
{
    let batch_size = batch_size.max(1);
    let persons = persons.into_iter();
    let (_, upper) = persons.size_hint();
    progress.begin(Phase::LoadPersons, upper.unwrap_or(0) as u64);

    let mut stats = LoadStats::default();
    let mut staged = 0;
    for person in persons {
        store.add_node(Node::from_serialize(PERSON, &person)?);
        stats.written += 1;
        staged += 1;
        if staged == batch_size {
            store.commit()?;
            stats.commits += 1;
            staged = 0;
            progress.advance(stats.written);
        }
    }
    if staged > 0 {
        store.commit()?;
        stats.commits += 1;
    }

    progress.advance(stats.written);
    progress.finish(&format!("{} person nodes written", stats.written));
    info!(
        persons = stats.written,
        commits = stats.commits,
        "person nodes loaded"
    );
    Ok(stats)
}

pub fn create_person_indexes<S: GraphStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.create_index(PERSON, USERNAME)?;
    store.create_index(PERSON, SET_DATE)?;
    debug!("person indexes ready");
    Ok(())
}

fn link_properties(created_at: i64) -> Properties {
    let mut props = Properties::new();
    props.insert("createdAt".to_string(), created_at.into());
    props.insert("src".to_string(), LINK_SOURCE.into());
    props
}

/// Writes every planned link. `clock` is read once per hub for the links'
/// `createdAt`.
pub fn load_links<S, P>(
    store: &mut S,
    plan: &LinkPlan,
    mode: EdgeMode,
    mut clock: impl FnMut() -> i64,
    progress: &mut P,
) -> Result<LoadStats, StoreError>
where
    S: GraphStore + ?Sized,
    P: ProgressSink + ?Sized,
{
    let graph = store.graph().to_string();
    progress.begin(Phase::LoadLinks, plan.total_links() as u64);

    let mut stats = LoadStats::default();
    for (hub, username) in plan.hubs() {
        let created_at = clock();
        match mode {
            EdgeMode::PerEdge => {
                for target in plan.targets_of(hub) {
                    store.query(&queries::create_link(&graph, username, target, created_at))?;
                    stats.written += 1;
                    stats.commits += 1;
                    if stats.written % PROGRESS_STEP == 0 {
                        progress.advance(stats.written);
                    }
                }
            }
            EdgeMode::PerHub => {
                if plan.out_degree(hub) == 0 {
                    continue;
                }
                for target in plan.targets_of(hub) {
                    store.add_edge(Edge {
                        relation: LINK.to_string(),
                        label: PERSON.to_string(),
                        key: USERNAME.to_string(),
                        src: username.to_string(),
                        dst: target.to_string(),
                        properties: link_properties(created_at),
                    });
                }
                store.commit()?;
                stats.written += plan.out_degree(hub) as u64;
                stats.commits += 1;
                progress.advance(stats.written);
            }
        }
    }

    progress.advance(stats.written);
    progress.finish(&format!("{} connections created", stats.written));
    info!(links = stats.written, ?mode, "links loaded");
    Ok(stats)
}
