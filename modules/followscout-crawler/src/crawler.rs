//! The crawl core: a greedy best-first walk over the follow graph.
//!
//! Each expansion fetches one page of an account's followings, resolves
//! the candidates' profiles, accepts matches into the sink, and estimates
//! the page's yield. Matching candidates are evaluated by a shallow
//! "sample" expansion (one page, no further recursion) whose yield becomes
//! their frontier priority, and the account itself is requeued at its own
//! yield so large followings paginate across many scheduler turns instead
//! of blocking on full enumeration.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use followscout_common::{AccountId, AcceptedRecord, Cursor, ProfileRecord};

use crate::directory::Directory;
use crate::frontier::{Frontier, FrontierEntry};
use crate::sink::ResultSink;

/// Knobs for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// "account based in" value that counts as a hit.
    pub target_region: String,
    /// Probability of re-sampling a matching candidate that is already
    /// queued, to refresh its yield estimate.
    pub explore_probability: f64,
    /// Stop after this many newly accepted records. 0 = unbounded.
    pub max_accepted: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            target_region: "China".to_string(),
            explore_probability: 0.2,
            max_accepted: 0,
        }
    }
}

#[derive(Default)]
struct Counters {
    expansions: AtomicU64,
    samples: AtomicU64,
    profiles_resolved: AtomicU64,
    accepted: AtomicU64,
}

/// Stats from a crawl run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub expansions: u64,
    pub samples: u64,
    pub profiles_resolved: u64,
    pub accepted: u64,
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Crawl Complete ===")?;
        writeln!(f, "Expansions:        {}", self.expansions)?;
        writeln!(f, "Sample calls:      {}", self.samples)?;
        writeln!(f, "Profiles resolved: {}", self.profiles_resolved)?;
        writeln!(f, "Accounts accepted: {}", self.accepted)?;
        Ok(())
    }
}

pub struct Crawler {
    directory: Arc<dyn Directory>,
    frontier: Frontier,
    visited: Mutex<HashSet<AccountId>>,
    sink: ResultSink,
    opts: CrawlOptions,
    counters: Counters,
}

impl Crawler {
    /// `visited` is the identity set replayed from the sink; it seeds the
    /// dedup state so reruns never re-accept prior records.
    pub fn new(
        directory: Arc<dyn Directory>,
        sink: ResultSink,
        visited: HashSet<AccountId>,
        opts: CrawlOptions,
    ) -> Self {
        Self {
            directory,
            frontier: Frontier::new(),
            visited: Mutex::new(visited),
            sink,
            opts,
            counters: Counters::default(),
        }
    }

    /// Run the crawl to a terminal state: frontier drained, or the
    /// accepted-record cap reached.
    pub async fn run(&self, seeds: &[AccountId]) -> CrawlStats {
        for seed in seeds {
            if !self.frontier.contains(seed) {
                self.frontier.push(FrontierEntry {
                    yield_rate: 1.0,
                    identity: seed.clone(),
                    cursor: Cursor::Start,
                });
            }
        }

        loop {
            let Some(entry) = self.frontier.pop() else {
                info!("Frontier drained, stopping");
                break;
            };

            info!(
                identity = %entry.identity,
                yield_rate = entry.yield_rate,
                frontier = self.frontier.len(),
                accepted = self.counters.accepted.load(Ordering::Relaxed),
                "Expanding"
            );
            self.expand(entry.identity, entry.cursor, false).await;

            let accepted = self.counters.accepted.load(Ordering::Relaxed);
            if self.opts.max_accepted > 0 && accepted >= self.opts.max_accepted {
                info!(accepted, "Reached accepted-record cap, stopping");
                break;
            }
        }

        self.stats()
    }

    /// Expand one page of `identity`'s followings. Returns the page's
    /// yield rate and the continuation cursor.
    ///
    /// A `sample` call estimates yield only: it still accepts hits into
    /// the sink, but never explores its own candidates or requeues, so
    /// recursion depth is structurally capped at one nested level.
    pub fn expand(
        &self,
        identity: AccountId,
        cursor: Cursor,
        sample: bool,
    ) -> BoxFuture<'_, (f64, Cursor)> {
        async move {
            if sample {
                self.counters.samples.fetch_add(1, Ordering::Relaxed);
            } else {
                self.counters.expansions.fetch_add(1, Ordering::Relaxed);
            }

            let (neighbors, next_cursor) =
                self.directory.list_neighbors(&identity, &cursor).await;
            debug!(
                identity = %identity,
                neighbors = neighbors.len(),
                sample,
                "Fetched neighbor page"
            );

            let profiles = self.directory.fetch_attributes(&neighbors).await;
            self.counters
                .profiles_resolved
                .fetch_add(profiles.len() as u64, Ordering::Relaxed);

            let mut hits = 0u64;
            let mut to_explore: Vec<AccountId> = Vec::new();
            for (candidate, profile) in &profiles {
                if !profile.matches_region(&self.opts.target_region) {
                    continue;
                }
                hits += 1;
                self.accept(candidate, profile);

                if sample {
                    continue;
                }
                let already_queued = self.frontier.contains(candidate);
                let explore = !already_queued
                    || rand::random_bool(self.opts.explore_probability.clamp(0.0, 1.0));
                if explore {
                    to_explore.push(candidate.clone());
                }
            }

            // Sample each exploration candidate's first page concurrently;
            // its measured yield becomes its frontier priority.
            let samples = to_explore.into_iter().map(|candidate| async move {
                let (yield_rate, sample_cursor) =
                    self.expand(candidate.clone(), Cursor::Start, true).await;
                (candidate, yield_rate, sample_cursor)
            });
            for (candidate, yield_rate, sample_cursor) in future::join_all(samples).await {
                if sample_cursor.is_exhausted() {
                    debug!(identity = %candidate, "Candidate exhausted during sampling, not enqueued");
                    continue;
                }
                self.frontier.push(FrontierEntry {
                    yield_rate,
                    identity: candidate,
                    cursor: sample_cursor,
                });
            }

            let yield_rate = if profiles.is_empty() {
                0.0
            } else {
                hits as f64 / profiles.len() as f64
            };

            if !sample && !next_cursor.is_exhausted() {
                self.frontier.push(FrontierEntry {
                    yield_rate,
                    identity: identity.clone(),
                    cursor: next_cursor.clone(),
                });
            }

            (yield_rate, next_cursor)
        }
        .boxed()
    }

    /// Sole path by which accounts enter the system of record. First
    /// acceptance wins; re-sightings are no-ops.
    fn accept(&self, candidate: &AccountId, profile: &ProfileRecord) {
        {
            let mut visited = self.visited.lock().unwrap();
            if !visited.insert(candidate.clone()) {
                return;
            }
        }

        let record = AcceptedRecord {
            username: candidate.clone(),
            info: profile.info.clone(),
        };
        match self.sink.append(&record) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                debug!(identity = %candidate, "Accepted account");
            }
            Err(e) => {
                warn!(identity = %candidate, error = %e, "Failed to persist accepted account");
            }
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            expansions: self.counters.expansions.load(Ordering::Relaxed),
            samples: self.counters.samples.load(Ordering::Relaxed),
            profiles_resolved: self.counters.profiles_resolved.load(Ordering::Relaxed),
            accepted: self.counters.accepted.load(Ordering::Relaxed),
        }
    }
}
