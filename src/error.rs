use crate::bench::Phase;
use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("username namespace exhausted after {attempts} attempts ({issued} usernames issued)")]
    NamespaceExhausted { attempts: u32, issued: usize },

    #[error("store failure during {phase}: {source}")]
    Store {
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("query failed during {phase}: {source}")]
    Query {
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("phase {phase}: {reason}")]
    PhaseState { phase: Phase, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait StoreResultExt<T> {
    fn during(self, phase: Phase) -> Result<T>;
    fn querying(self, phase: Phase) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn during(self, phase: Phase) -> Result<T> {
        self.map_err(|source| Error::Store { phase, source })
    }

    fn querying(self, phase: Phase) -> Result<T> {
        self.map_err(|source| Error::Query { phase, source })
    }
}
