use rand::Rng;
use rand::seq::index;

pub type HubId = u32;

/// Inclusive bounds on how many leaves a single hub links to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for DegreeBounds {
    fn default() -> Self {
        Self { min: 50, max: 2500 }
    }
}

impl DegreeBounds {
    /// Out-degree range actually drawn from when `leaf_count` leaves exist.
    ///
    /// The upper end is capped by the leaf count; when that cap falls below
    /// `min`, the lower end follows it down so every hub links to all leaves.
    pub fn range_for(&self, leaf_count: usize) -> (usize, usize) {
        let cap = self.max.min(leaf_count);
        (self.min.min(cap), cap)
    }
}

/// Link targets for every hub, stored as one target array sliced by per-hub offsets.
pub struct LinkPlan {
    hubs: Vec<String>,
    leaves: Vec<String>,
    offsets: Vec<usize>,
    targets: Vec<u32>,
}

impl LinkPlan {
    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn total_links(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn hub(&self, hub: HubId) -> &str {
        &self.hubs[hub as usize]
    }

    pub fn hubs(&self) -> impl Iterator<Item = (HubId, &str)> {
        self.hubs
            .iter()
            .enumerate()
            .map(|(i, name)| (i as HubId, name.as_str()))
    }

    pub fn out_degree(&self, hub: HubId) -> usize {
        self.offsets[hub as usize + 1] - self.offsets[hub as usize]
    }

    pub fn targets_of(&'_ self, hub: HubId) -> LinkTargetIter<'_> {
        LinkTargetIter::new(self, hub)
    }
}

pub struct LinkTargetIter<'a> {
    plan: &'a LinkPlan,
    start: usize,
    end: usize,
    next: usize,
}

impl<'a> LinkTargetIter<'a> {
    pub fn new(plan: &'a LinkPlan, hub: HubId) -> Self {
        Self {
            plan,
            start: plan.offsets[hub as usize],
            end: plan.offsets[hub as usize + 1],
            next: 0,
        }
    }
}

impl<'a> Iterator for LinkTargetIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start + self.next < self.end {
            let leaf = self.plan.targets[self.start + self.next] as usize;
            self.next += 1;
            Some(self.plan.leaves[leaf].as_str())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LinkTargetIter<'_> {}

/// Picks, for every hub, a set of distinct leaves to link to.
///
/// Each hub's out-degree is drawn independently from `bounds.range_for(leaves.len())`
/// and its targets are sampled without replacement. Different hubs may share targets.
pub fn plan_links<R: Rng + ?Sized>(
    rng: &mut R,
    hubs: Vec<String>,
    leaves: Vec<String>,
    bounds: DegreeBounds,
) -> LinkPlan {
    let (lo, hi) = bounds.range_for(leaves.len());
    let mut offsets = Vec::with_capacity(hubs.len() + 1);
    let mut targets = Vec::new();
    offsets.push(0);

    for _ in 0..hubs.len() {
        let degree = rng.random_range(lo..=hi);
        targets.extend(
            index::sample(rng, leaves.len(), degree)
                .into_iter()
                .map(|leaf| leaf as u32),
        );
        offsets.push(targets.len());
    }

    LinkPlan {
        hubs,
        leaves,
        offsets,
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_range_for() {
        let bounds = DegreeBounds::default();

        assert_eq!((50, 2500), bounds.range_for(10_000));
        assert_eq!((50, 495), bounds.range_for(495));
        assert_eq!((7, 7), bounds.range_for(7));
        assert_eq!((0, 0), bounds.range_for(0));
    }

    #[test]
    fn test_out_degree_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_links(&mut rng, names("hub", 5), names("leaf", 495), DegreeBounds::default());

        assert_eq!(5, plan.hub_count());
        for (hub, _) in plan.hubs() {
            let degree = plan.out_degree(hub);
            assert!((50..=495).contains(&degree), "degree {degree}");
        }
    }

    #[test]
    fn test_targets_are_distinct_leaves() {
        let mut rng = StdRng::seed_from_u64(11);
        let leaves = names("leaf", 300);
        let known: HashSet<String> = leaves.iter().cloned().collect();
        let plan = plan_links(&mut rng, names("hub", 4), leaves, DegreeBounds::default());

        for (hub, _) in plan.hubs() {
            let targets: Vec<&str> = plan.targets_of(hub).collect();
            let unique: HashSet<&str> = targets.iter().copied().collect();
            assert_eq!(targets.len(), unique.len());
            assert_eq!(plan.out_degree(hub), targets.len());
            assert!(targets.iter().all(|t| known.contains(*t)));
        }
    }

    #[test]
    fn test_total_is_sum_of_out_degrees() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = plan_links(&mut rng, names("hub", 9), names("leaf", 120), DegreeBounds::default());

        let sum: usize = plan.hubs().map(|(hub, _)| plan.out_degree(hub)).sum();
        assert_eq!(sum, plan.total_links());
    }

    #[test]
    fn test_upper_cap_applies() {
        let mut rng = StdRng::seed_from_u64(5);
        let plan = plan_links(&mut rng, names("hub", 3), names("leaf", 3000), DegreeBounds::default());

        for (hub, _) in plan.hubs() {
            assert!(plan.out_degree(hub) <= 2500);
            assert!(plan.out_degree(hub) >= 50);
        }
    }

    #[test]
    fn test_few_leaves_links_hub_to_all() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_links(&mut rng, names("hub", 3), names("leaf", 7), DegreeBounds::default());

        assert_eq!(21, plan.total_links());
        for (hub, _) in plan.hubs() {
            assert_eq!(7, plan.out_degree(hub));
        }
    }

    #[test]
    fn test_no_leaves() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_links(&mut rng, names("hub", 2), vec![], DegreeBounds::default());

        assert!(plan.is_empty());
        assert_eq!(0, plan.targets_of(0).count());
        assert_eq!(0, plan.targets_of(1).count());
    }

    #[test]
    fn test_no_hubs() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_links(&mut rng, vec![], names("leaf", 80), DegreeBounds::default());

        assert_eq!(0, plan.hub_count());
        assert_eq!(80, plan.leaf_count());
        assert_eq!(0, plan.total_links());
    }

    #[test]
    fn test_hub_names_kept_in_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_links(&mut rng, names("hub", 3), names("leaf", 60), DegreeBounds::default());

        assert_eq!("hub0", plan.hub(0));
        assert_eq!(
            vec!["hub0", "hub1", "hub2"],
            plan.hubs().map(|(_, name)| name).collect::<Vec<_>>()
        );
    }
}
