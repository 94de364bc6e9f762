use crate::core::ids::UsernameRegistry;
use crate::error::Error;
use crate::generate::lexicon::Lexicon;
use chrono::TimeDelta;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

const SET_DATE_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub username: String,
    pub name: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(flatten)]
    pub class: PersonClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PersonClass {
    Hub {
        company: String,
    },
    Leaf {
        #[serde(rename = "setDate")]
        set_date: i64,
    },
}

impl Person {
    pub fn is_hub(&self) -> bool {
        matches!(self.class, PersonClass::Hub { .. })
    }
}

/// Retry budget for finding an unused username.
///
/// After `attempts_per_level` collisions in a row the namespace is widened by
/// one level (two extra digits). Once `max_level` is exhausted as well,
/// generation fails with [`Error::NamespaceExhausted`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsernamePolicy {
    pub attempts_per_level: u32,
    pub max_level: u32,
}

impl Default for UsernamePolicy {
    fn default() -> Self {
        Self {
            attempts_per_level: 16,
            max_level: 6,
        }
    }
}

pub struct GeneratorConfig {
    pub total: u64,
    pub hubs: u64,
    /// Epoch seconds all timestamps are sampled back from.
    pub now: i64,
    pub policy: UsernamePolicy,
}

/// Lazily produces `total` persons, the first `hubs` of them hubs.
///
/// Single pass: once exhausted, or after yielding an error, it only returns `None`.
pub struct PersonGenerator<R> {
    rng: R,
    lexicon: Lexicon,
    policy: UsernamePolicy,
    registry: UsernameRegistry,
    total: u64,
    hubs: u64,
    produced: u64,
    level: u32,
    oldest: i64,
    now: i64,
    failed: bool,
}

impl<R: Rng> PersonGenerator<R> {
    pub fn new(rng: R, lexicon: Lexicon, cfg: &GeneratorConfig) -> Self {
        Self {
            rng,
            lexicon,
            policy: cfg.policy,
            registry: UsernameRegistry::with_capacity(cfg.total.min(1 << 20) as usize),
            total: cfg.total,
            hubs: cfg.hubs.min(cfg.total),
            produced: 0,
            level: 0,
            oldest: cfg.now - TimeDelta::days(730).num_seconds(),
            now: cfg.now,
            failed: false,
        }
    }

    pub fn issued(&self) -> usize {
        self.registry.len()
    }

    fn next_username(&mut self) -> Result<String, Error> {
        let mut attempts = 0;
        loop {
            for _ in 0..self.policy.attempts_per_level {
                attempts += 1;
                let candidate = self.lexicon.username(&mut self.rng, self.level);
                if self.registry.try_register(&candidate).is_some() {
                    return Ok(candidate);
                }
            }
            if self.level >= self.policy.max_level {
                return Err(Error::NamespaceExhausted {
                    attempts,
                    issued: self.registry.len(),
                });
            }
            self.level += 1;
            debug!(
                level = self.level,
                issued = self.registry.len(),
                "widening username namespace"
            );
        }
    }

    fn timestamp_before(&mut self, gap: TimeDelta) -> i64 {
        let newest = (self.now - gap.num_seconds()).max(self.oldest);
        self.rng.random_range(self.oldest..=newest)
    }
}

impl<R: Rng> Iterator for PersonGenerator<R> {
    type Item = Result<Person, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.produced == self.total {
            return None;
        }

        let username = match self.next_username() {
            Ok(username) => username,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };
        let name = self.lexicon.full_name(&mut self.rng);
        let updated_at = self.timestamp_before(TimeDelta::minutes(1));
        let class = if self.produced < self.hubs {
            PersonClass::Hub {
                company: self.lexicon.company(&mut self.rng),
            }
        } else {
            let set_date = if self.rng.random_bool(SET_DATE_PROBABILITY) {
                self.timestamp_before(TimeDelta::minutes(5))
            } else {
                0
            };
            PersonClass::Leaf { set_date }
        };

        self.produced += 1;
        Some(Ok(Person {
            username,
            name,
            updated_at,
            class,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, usize::try_from(self.total - self.produced).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    const NOW: i64 = 1_700_000_000;
    const TWO_YEARS: i64 = 730 * 86_400;

    const TINY: Lexicon = Lexicon {
        first_names: &["Ann"],
        last_names: &["Lee"],
        company_suffixes: &["Ltd"],
    };

    fn config(total: u64, hubs: u64) -> GeneratorConfig {
        GeneratorConfig {
            total,
            hubs,
            now: NOW,
            policy: UsernamePolicy::default(),
        }
    }

    fn generate(total: u64, hubs: u64, seed: u64) -> Vec<Person> {
        PersonGenerator::new(StdRng::seed_from_u64(seed), Lexicon::default(), &config(total, hubs))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_counts_and_unique_usernames() {
        let persons = generate(500, 5, 42);

        assert_eq!(500, persons.len());
        assert_eq!(5, persons.iter().filter(|p| p.is_hub()).count());
        assert!(persons[..5].iter().all(Person::is_hub));
        let unique: HashSet<&str> = persons.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(500, unique.len());
    }

    #[test]
    fn test_no_hubs() {
        let persons = generate(20, 0, 1);

        assert_eq!(20, persons.len());
        assert!(persons.iter().all(|p| !p.is_hub()));
    }

    #[test]
    fn test_all_hubs() {
        let persons = generate(20, 20, 1);

        assert!(persons.iter().all(Person::is_hub));
    }

    #[test]
    fn test_empty() {
        assert!(generate(0, 0, 1).is_empty());
    }

    #[test]
    fn test_timestamps_in_window() {
        let persons = generate(2000, 10, 8);

        let mut set = 0;
        for p in &persons {
            assert!(p.updated_at >= NOW - TWO_YEARS && p.updated_at <= NOW - 60);
            if let PersonClass::Leaf { set_date } = p.class {
                if set_date != 0 {
                    set += 1;
                    assert!(set_date >= NOW - TWO_YEARS && set_date <= NOW - 300);
                }
            }
        }
        let share = set as f64 / 1990.0;
        assert!(share > 0.2 && share < 0.4, "share {share}");
    }

    #[test]
    fn test_exhausted_namespace_is_reported_and_fused() {
        let cfg = GeneratorConfig {
            policy: UsernamePolicy {
                attempts_per_level: 16,
                max_level: 0,
            },
            ..config(50, 0)
        };
        let mut generator = PersonGenerator::new(StdRng::seed_from_u64(3), TINY, &cfg);

        let mut ok = 0;
        let err = loop {
            match generator.next() {
                Some(Ok(_)) => ok += 1,
                Some(Err(err)) => break err,
                None => panic!("generator ended without exhausting the namespace"),
            }
        };
        assert!(ok <= 5);
        assert!(matches!(err, Error::NamespaceExhausted { issued, .. } if issued == ok));
        assert!(generator.next().is_none());
    }

    #[test]
    fn test_namespace_widens() {
        let cfg = GeneratorConfig {
            policy: UsernamePolicy {
                attempts_per_level: 16,
                max_level: 3,
            },
            ..config(40, 2)
        };
        let persons = PersonGenerator::new(StdRng::seed_from_u64(3), TINY, &cfg)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let unique: HashSet<&str> = persons.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(40, unique.len());
        assert!(
            persons
                .iter()
                .any(|p| p.username.ends_with(|c: char| c.is_ascii_digit()))
        );
    }

    #[test]
    fn test_serialized_properties() {
        let persons = generate(2, 1, 5);

        let hub = serde_json::to_value(&persons[0]).unwrap();
        assert!(hub.get("company").is_some());
        assert!(hub.get("setDate").is_none());
        assert!(hub.get("updatedAt").is_some());

        let leaf = serde_json::to_value(&persons[1]).unwrap();
        assert!(leaf.get("company").is_none());
        assert!(leaf.get("setDate").is_some());
        assert_eq!(
            Some(persons[1].username.as_str()),
            leaf.get("username").and_then(|v| v.as_str())
        );
    }
}
