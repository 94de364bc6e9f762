use crate::bench::{Phase, Stopwatch};
use crate::config::RunConfig;
use crate::core::memory::estimate_plan_memory;
use crate::core::plan::{HubId, LinkPlan, plan_links};
use crate::error::{Result, StoreResultExt};
use crate::generate::lexicon::Lexicon;
use crate::generate::persons::{GeneratorConfig, Person, PersonGenerator};
use crate::load::{create_person_indexes, load_links, load_persons, reset_graph};
use crate::progress::ProgressSink;
use crate::queries;
use crate::report::Summary;
use crate::store::{BulkMode, GraphStore, ResultSet};
use rand::Rng;
use tracing::info;

pub struct RunReport {
    pub summary: Summary,
    pub deleted_existing: bool,
    pub link_counts: ResultSet,
    /// A random hub and everything it links to.
    pub connections: Option<(String, ResultSet)>,
    /// A random hub and the number of its targets with a set date before today.
    pub dated_links: Option<(String, usize)>,
    pub store_info: Vec<(String, i64)>,
}

/// Seeds the store's graph per `cfg`, runs the benchmark queries and collects
/// timings. `clock` returns the current time in epoch seconds.
pub fn run<S, R, P>(
    cfg: &RunConfig,
    store: &mut S,
    rng: &mut R,
    clock: impl Fn() -> i64,
    progress: &mut P,
) -> Result<RunReport>
where
    S: GraphStore + ?Sized,
    R: Rng,
    P: ProgressSink + ?Sized,
{
    cfg.validate()?;
    let graph = store.graph().to_string();
    let mut sw = Stopwatch::new();

    let deleted_existing = reset_graph(store, &graph).during(Phase::Reset)?;

    let gen_cfg = GeneratorConfig {
        total: cfg.total,
        hubs: cfg.hubs,
        now: clock(),
        policy: cfg.username_policy,
    };
    let (persons, plan) = sw.time(Phase::Generate, || {
        let persons = PersonGenerator::new(&mut *rng, Lexicon::default(), &gen_cfg)
            .collect::<Result<Vec<Person>>>()?;
        let plan = plan_from(&mut *rng, &persons, cfg);
        Ok((persons, plan))
    })?;
    info!(
        persons = persons.len(),
        hubs = plan.hub_count(),
        links = plan.total_links(),
        "dataset generated"
    );

    let mut bulk = BulkMode::acquire(&mut *store).during(Phase::LoadPersons)?;
    let person_stats = sw.time(Phase::LoadPersons, || {
        let stats = load_persons(&mut *bulk, persons, cfg.batch_size, &mut *progress)
            .during(Phase::LoadPersons)?;
        create_person_indexes(&mut *bulk).during(Phase::LoadPersons)?;
        Ok(stats)
    })?;
    sw.time(Phase::LoadLinks, || {
        load_links(&mut *bulk, &plan, cfg.edge_mode, &clock, &mut *progress)
            .during(Phase::LoadLinks)
    })?;
    bulk.finish().during(Phase::LoadLinks)?;

    let link_counts = store
        .query(&queries::link_counts(&graph))
        .querying(Phase::CountLinks)?;

    let connections = match random_hub(rng, &plan) {
        Some(hub) => {
            let username = plan.hub(hub).to_string();
            let result = sw.time(Phase::ShowConnections, || {
                store
                    .query(&queries::connections_of(&graph, &username))
                    .querying(Phase::ShowConnections)
            })?;
            Some((username, result))
        }
        None => None,
    };

    let dated_links = match random_hub(rng, &plan) {
        Some(hub) => {
            let username = plan.hub(hub).to_string();
            let today = clock();
            let result = sw.time(Phase::SearchLinks, || {
                store
                    .query(&queries::dated_links_of(&graph, &username, today))
                    .querying(Phase::SearchLinks)
            })?;
            Some((username, result.len()))
        }
        None => None,
    };

    let store_info = store.info().during(Phase::Inspect)?;

    if cfg.cleanup {
        reset_graph(store, &graph).during(Phase::Cleanup)?;
    }

    let summary = Summary {
        persons: person_stats.written,
        hubs: plan.hub_count() as u64,
        links: plan.total_links() as u64,
        node_commits: person_stats.commits,
        plan_bytes: estimate_plan_memory(&plan).bytes,
        durations: Vec::new(),
    }
    .with_timings(&sw);

    Ok(RunReport {
        summary,
        deleted_existing,
        link_counts,
        connections,
        dated_links,
        store_info,
    })
}

fn plan_from<R: Rng>(rng: &mut R, persons: &[Person], cfg: &RunConfig) -> LinkPlan {
    let (hubs, leaves): (Vec<&Person>, Vec<&Person>) = persons.iter().partition(|p| p.is_hub());
    plan_links(
        rng,
        hubs.into_iter().map(|p| p.username.clone()).collect(),
        leaves.into_iter().map(|p| p.username.clone()).collect(),
        cfg.degree_bounds,
    )
}

fn random_hub<R: Rng>(rng: &mut R, plan: &LinkPlan) -> Option<HubId> {
    (plan.hub_count() > 0).then(|| rng.random_range(0..plan.hub_count()) as HubId)
}
