//! Round-based concurrent hostname resolution.
//!
//! Every round issues one lookup per host that is neither resolved nor
//! abandoned, and the round loop is the only place per-host state is
//! updated. Between rounds the resolver pauses before retrying failures.

use crate::error::{LookupError, ResolveError, Result};
use crate::lookup::Lookup;
use crate::settings::ParallelSettings;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of a resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Addresses of every host that resolved
    pub host_to_ips: BTreeMap<String, Vec<IpAddr>>,
    /// One message per host that never resolved, in request order
    pub warnings: Vec<String>,
}

#[derive(Debug)]
struct HostState {
    host: String,
    ips: Vec<IpAddr>,
    fails: u32,
    last_error: Option<LookupError>,
}

impl HostState {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ips: Vec::new(),
            fails: 0,
            last_error: None,
        }
    }

    fn is_resolved(&self) -> bool {
        !self.ips.is_empty()
    }

    fn is_pending(&self, max_fails: u32) -> bool {
        !self.is_resolved() && self.fails < max_fails
    }

    fn record_failure(&mut self, error: LookupError, max_fails: u32) {
        self.fails += 1;
        if self.fails >= max_fails {
            debug!(host = %self.host, fails = self.fails, error = %error, "abandoning host");
        }
        self.last_error = Some(error);
    }
}

/// Resolves many hosts concurrently under a time and attempt budget.
#[derive(Clone)]
pub struct ParallelResolver {
    lookup: Arc<dyn Lookup>,
}

impl ParallelResolver {
    /// Create a resolver on top of a single-host lookup.
    #[must_use]
    pub fn new(lookup: Arc<dyn Lookup>) -> Self {
        Self { lookup }
    }

    /// Resolve every host in `settings`.
    ///
    /// A host that never resolves only produces a warning. The call fails as
    /// a whole when the share of such hosts exceeds `max_fail_ratio`, or when
    /// `cancel` fires, in which case in-flight lookups are dropped and the
    /// hosts resolved so far are returned inside the error.
    pub async fn resolve(
        &self,
        settings: &ParallelSettings,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        settings.validate()?;
        let repeat = &settings.repeat;

        let mut states: Vec<HostState> = settings.hosts.iter().map(|h| HostState::new(h)).collect();
        if states.is_empty() {
            return Ok(Resolution::default());
        }

        let deadline = Instant::now() + repeat.max_duration;
        let mut rounds_without_new = 0;
        let mut round = 0u32;

        loop {
            let pending: Vec<usize> = states
                .iter()
                .enumerate()
                .filter(|(_, state)| state.is_pending(repeat.max_fails))
                .map(|(index, _)| index)
                .collect();
            if pending.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                debug!(round, "resolution budget exhausted");
                break;
            }

            round += 1;
            let newly_resolved = self
                .run_round(&mut states, &pending, deadline, repeat.max_fails, cancel)
                .await
                .map_err(|()| ResolveError::Cancelled {
                    partial: collect_resolved(&states, repeat.sort_ips),
                })?;
            debug!(round, hosts = pending.len(), newly_resolved, "resolution round done");

            if newly_resolved == 0 {
                rounds_without_new += 1;
                if rounds_without_new >= repeat.max_no_new {
                    debug!(round, "no new host resolved for {rounds_without_new} rounds");
                    break;
                }
            } else {
                rounds_without_new = 0;
            }

            if !states.iter().any(|s| s.is_pending(repeat.max_fails)) {
                break;
            }

            let wake = (Instant::now() + repeat.between_duration).min(deadline);
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(ResolveError::Cancelled {
                        partial: collect_resolved(&states, repeat.sort_ips),
                    });
                }
                () = sleep_until(wake) => {}
            }
        }

        finish(&states, settings)
    }

    /// Run one round of lookups over `pending`, committing each answer as it
    /// arrives. Returns the number of newly resolved hosts, or `Err(())` on
    /// cancellation.
    async fn run_round(
        &self,
        states: &mut [HostState],
        pending: &[usize],
        deadline: Instant,
        max_fails: u32,
        cancel: &CancellationToken,
    ) -> std::result::Result<usize, ()> {
        let lookup = self.lookup.as_ref();
        let mut lookups: FuturesUnordered<_> = pending
            .iter()
            .map(|&index| {
                let host = states[index].host.clone();
                async move {
                    let answer = lookup.lookup(&host).await;
                    (index, answer)
                }
            })
            .collect();

        let mut answered = vec![false; states.len()];
        let mut newly_resolved = 0;
        let round_deadline = sleep_until(deadline);
        tokio::pin!(round_deadline);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(()),
                () = &mut round_deadline => {
                    for &index in pending.iter().filter(|&&index| !answered[index]) {
                        let error = LookupError::new(states[index].host.clone(), "lookup timed out");
                        states[index].record_failure(error, max_fails);
                    }
                    break;
                }
                next = lookups.next() => {
                    let Some((index, answer)) = next else { break };
                    answered[index] = true;
                    let state = &mut states[index];
                    match answer {
                        Ok(ips) if !ips.is_empty() => {
                            for ip in ips {
                                if !state.ips.contains(&ip) {
                                    state.ips.push(ip);
                                }
                            }
                            newly_resolved += 1;
                        }
                        Ok(_) => {
                            let error = LookupError::new(state.host.clone(), "no addresses returned");
                            state.record_failure(error, max_fails);
                        }
                        Err(error) => state.record_failure(error, max_fails),
                    }
                }
            }
        }

        Ok(newly_resolved)
    }
}

fn collect_resolved(states: &[HostState], sort_ips: bool) -> Resolution {
    let host_to_ips = states
        .iter()
        .filter(|state| state.is_resolved())
        .map(|state| {
            let mut ips = state.ips.clone();
            if sort_ips {
                ips.sort_unstable();
            }
            (state.host.clone(), ips)
        })
        .collect();

    Resolution {
        host_to_ips,
        warnings: Vec::new(),
    }
}

fn finish(states: &[HostState], settings: &ParallelSettings) -> Result<Resolution> {
    let mut resolution = collect_resolved(states, settings.repeat.sort_ips);

    for state in states.iter().filter(|state| !state.is_resolved()) {
        let warning = match &state.last_error {
            Some(error) => format!("{error} (after {} attempts)", state.fails),
            None => format!(
                "cannot resolve {}: resolution stopped before a lookup completed",
                state.host
            ),
        };
        resolution.warnings.push(warning);
    }

    let total = states.len();
    let failed = resolution.warnings.len();
    info!(
        resolved = resolution.host_to_ips.len(),
        failed, total, "parallel resolution finished"
    );

    #[allow(clippy::cast_precision_loss)]
    let ratio = failed as f64 / total as f64;
    if ratio > settings.max_fail_ratio {
        return Err(ResolveError::TooManyFailures {
            failed,
            total,
            max_ratio: settings.max_fail_ratio,
            partial: resolution,
        });
    }

    Ok(resolution)
}
