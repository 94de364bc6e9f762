use crate::error::{Error, Result};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Named stages of a run. The ones in [`Phase::TIMED`] are benchmarked; the
/// rest only label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Reset,
    Generate,
    LoadPersons,
    LoadLinks,
    CountLinks,
    ShowConnections,
    SearchLinks,
    Inspect,
    Cleanup,
}

impl Phase {
    pub const TIMED: [Phase; 5] = [
        Phase::Generate,
        Phase::LoadPersons,
        Phase::LoadLinks,
        Phase::ShowConnections,
        Phase::SearchLinks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Reset => "reset-graph",
            Phase::Generate => "build-persons",
            Phase::LoadPersons => "insert-persons",
            Phase::LoadLinks => "build-edges",
            Phase::CountLinks => "count-links",
            Phase::ShowConnections => "search-connections-for-random-prime",
            Phase::SearchLinks => "search-links",
            Phase::Inspect => "store-info",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub started: Instant,
    pub stopped: Instant,
}

impl PhaseTiming {
    pub fn elapsed(&self) -> Duration {
        self.stopped.duration_since(self.started)
    }
}

/// Records strictly sequential, non-overlapping phases. Each phase can be
/// recorded at most once per stopwatch.
#[derive(Debug, Default)]
pub struct Stopwatch {
    running: Option<(Phase, Instant)>,
    recorded: Vec<PhaseTiming>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, phase: Phase) -> Result<()> {
        if self.running.is_some() {
            return Err(Error::PhaseState {
                phase,
                reason: "another phase is still running",
            });
        }
        if self.duration(phase).is_some() {
            return Err(Error::PhaseState {
                phase,
                reason: "already recorded",
            });
        }
        info!(%phase, "phase started");
        self.running = Some((phase, Instant::now()));
        Ok(())
    }

    pub fn stop(&mut self, phase: Phase) -> Result<Duration> {
        match self.running {
            Some((running, started)) if running == phase => {
                self.running = None;
                let timing = PhaseTiming {
                    phase,
                    started,
                    stopped: Instant::now(),
                };
                info!(%phase, elapsed_ms = timing.elapsed().as_millis() as u64, "phase finished");
                self.recorded.push(timing);
                Ok(timing.elapsed())
            }
            _ => Err(Error::PhaseState {
                phase,
                reason: "not running",
            }),
        }
    }

    /// Drops the running phase without recording it.
    pub fn abandon(&mut self) -> Option<Phase> {
        self.running.take().map(|(phase, _)| phase)
    }

    /// Times `f` as `phase`. A failing `f` leaves no record of the phase.
    pub fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.start(phase)?;
        match f() {
            Ok(value) => {
                self.stop(phase)?;
                Ok(value)
            }
            Err(err) => {
                self.abandon();
                Err(err)
            }
        }
    }

    pub fn duration(&self, phase: Phase) -> Option<Duration> {
        self.recorded
            .iter()
            .find(|t| t.phase == phase)
            .map(PhaseTiming::elapsed)
    }

    pub fn timings(&self) -> &[PhaseTiming] {
        &self.recorded
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// Items per second, or `None` when the phase took no measurable time.
pub fn per_second(count: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        Some(count as f64 / secs)
    } else {
        None
    }
}
