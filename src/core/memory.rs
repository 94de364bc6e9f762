use crate::core::plan::LinkPlan;

pub struct MemoryStats {
    pub links: usize,
    pub bytes: usize,
}

/// Rough heap footprint of a link plan: target indexes, offsets and the
/// username strings it owns.
pub fn estimate_plan_memory(plan: &LinkPlan) -> MemoryStats {
    let names: usize = plan
        .hubs()
        .map(|(_, name)| name.len() + size_of::<String>())
        .sum();
    MemoryStats {
        links: plan.total_links(),
        bytes: plan.total_links() * size_of::<u32>()
            + (plan.hub_count() + 1) * size_of::<usize>()
            + names
            + plan.leaf_count() * size_of::<String>(),
    }
}
