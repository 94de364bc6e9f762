use crate::core::plan::DegreeBounds;
use crate::generate::persons::UsernamePolicy;

pub const DEFAULT_BATCH_SIZE: usize = 128;
pub const DEFAULT_GRAPH: &str = "social";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("hub count {hubs} exceeds total person count {total}")]
    TooManyHubs { hubs: u64, total: u64 },
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("graph name must not be empty")]
    EmptyGraphName,
    #[error("degree bounds are inverted: min {min} > max {max}")]
    InvertedDegreeBounds { min: usize, max: usize },
}

/// How links are written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// One match-and-create statement per link.
    #[default]
    PerEdge,
    /// All links of a hub staged and committed together.
    PerHub,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub graph: String,
    pub total: u64,
    pub hubs: u64,
    pub batch_size: usize,
    pub edge_mode: EdgeMode,
    pub degree_bounds: DegreeBounds,
    pub username_policy: UsernamePolicy,
    pub cleanup: bool,
}

impl RunConfig {
    pub fn new(total: u64, hubs: u64) -> Self {
        Self {
            graph: DEFAULT_GRAPH.to_string(),
            total,
            hubs,
            batch_size: DEFAULT_BATCH_SIZE,
            edge_mode: EdgeMode::default(),
            degree_bounds: DegreeBounds::default(),
            username_policy: UsernamePolicy::default(),
            cleanup: false,
        }
    }

    /// Hub count used when none is given: 1% of the total, at least 3,
    /// never more than the total itself.
    pub fn default_hubs(total: u64) -> u64 {
        (total / 100).max(3).min(total)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hubs > self.total {
            return Err(ConfigError::TooManyHubs {
                hubs: self.hubs,
                total: self.total,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.graph.is_empty() {
            return Err(ConfigError::EmptyGraphName);
        }
        if self.degree_bounds.min > self.degree_bounds.max {
            return Err(ConfigError::InvertedDegreeBounds {
                min: self.degree_bounds.min,
                max: self.degree_bounds.max,
            });
        }
        Ok(())
    }

    pub fn leaves(&self) -> u64 {
        self.total.saturating_sub(self.hubs)
    }
}
