//! Page navigation with layered wait strategies and retry
//!
//! Heavy storefronts often never reach the `load` event in reasonable time
//! (chat widgets, analytics beacons, endless image carousels). Each round
//! tries progressively weaker readiness conditions before backing off.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use log::{debug, info, warn};

use super::crawl_types::{ScrapeError, ScrapeResult};
use crate::page::PageHandle;

/// Readiness condition a navigation waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitStrategy {
    /// Full `load` event
    Load,
    /// `DOMContentLoaded` (`document.readyState` is `interactive` or later)
    DomContentLoaded,
    /// Navigation committed, nothing else awaited
    Commit,
}

impl WaitStrategy {
    /// Default per-strategy timeout
    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::Load => Duration::from_secs(30),
            Self::DomContentLoaded => Duration::from_secs(20),
            Self::Commit => Duration::from_secs(15),
        }
    }
}

impl fmt::Display for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("navigation failed: {0}")]
    Failed(String),
}

/// A page that can be pointed at a URL
#[async_trait]
pub trait NavigablePage: Send + Sync {
    /// Navigate and wait for `strategy`'s readiness condition
    ///
    /// Implementations need not enforce a deadline; the caller wraps each call
    /// in the strategy timeout.
    async fn navigate(&self, url: &str, strategy: WaitStrategy) -> Result<(), NavigationError>;
}

/// Retry/backoff knobs for [`navigate_with_retry`]
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    /// Number of rounds through `strategies`
    pub max_retries: u32,
    /// Strategies tried in order each round, with their timeouts
    pub strategies: Vec<(WaitStrategy, Duration)>,
    /// Backoff unit; the delay after failed attempt `n` is `backoff_base * 2^n`
    pub backoff_base: Duration,
    /// Fixed delay after a successful navigation
    pub settle_delay: Duration,
    /// Bound on the post-navigation network-idle wait
    pub network_idle_timeout: Duration,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::utils::DEFAULT_NAVIGATION_RETRIES,
            strategies: [
                WaitStrategy::Load,
                WaitStrategy::DomContentLoaded,
                WaitStrategy::Commit,
            ]
            .into_iter()
            .map(|s| (s, s.default_timeout()))
            .collect(),
            backoff_base: Duration::from_secs(1),
            settle_delay: Duration::from_millis(crate::utils::DEFAULT_POST_NAVIGATION_SETTLE_MILLIS),
            network_idle_timeout: Duration::from_secs(
                crate::utils::DEFAULT_NETWORK_IDLE_TIMEOUT_SECS,
            ),
        }
    }
}

impl NavigationPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Navigate `page` to `url`, trying every wait strategy for up to
/// `policy.max_retries` rounds
///
/// A strategy that times out falls through to the next one immediately; any
/// other failure backs off first (unless it happened in the last round).
/// Rounds are separated by the same exponential backoff. Once a strategy
/// succeeds the page is given `settle_delay` plus a best-effort network-idle
/// wait before returning.
///
/// # Errors
/// `ScrapeError::Navigation` when every strategy failed in every round.
pub async fn navigate_with_retry<P>(page: &P, url: &str, policy: &NavigationPolicy) -> ScrapeResult<()>
where
    P: NavigablePage + PageHandle + ?Sized,
{
    for attempt in 0..policy.max_retries {
        let last_round = attempt + 1 >= policy.max_retries;

        for &(strategy, timeout) in &policy.strategies {
            info!(
                "→ Attempt {}/{}: loading {url} (wait: {strategy})",
                attempt + 1,
                policy.max_retries
            );

            let outcome = match tokio::time::timeout(timeout, page.navigate(url, strategy)).await {
                Ok(result) => result,
                Err(_) => Err(NavigationError::Timeout(timeout)),
            };

            match outcome {
                Ok(()) => {
                    info!("✓ Page loaded using {strategy}");
                    tokio::time::sleep(policy.settle_delay).await;
                    if let Err(e) = page.wait_for_network_idle(policy.network_idle_timeout).await {
                        debug!("Network idle wait ended early: {e:#}");
                    }
                    return Ok(());
                }
                Err(NavigationError::Timeout(elapsed)) => {
                    warn!("Timeout after {elapsed:?} with {strategy}, trying next strategy");
                }
                Err(e) => {
                    warn!("Error with {strategy}: {e}");
                    if !last_round {
                        tokio::time::sleep(policy.backoff(attempt)).await;
                    }
                }
            }
        }

        if !last_round {
            let delay = policy.backoff(attempt);
            info!("→ Retrying in {}s...", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    Err(ScrapeError::Navigation {
        url: url.to_string(),
        attempts: policy.max_retries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_strategy_ladder() {
        let policy = NavigationPolicy::default();
        let ladder: Vec<_> = policy.strategies.iter().map(|(s, t)| (s.to_string(), t.as_secs())).collect();
        assert_eq!(
            ladder,
            [
                ("load".to_string(), 30),
                ("domcontentloaded".to_string(), 20),
                ("commit".to_string(), 15)
            ]
        );
        assert_eq!(policy.max_retries, 3);
    }

    #[test]
    fn backoff_doubles() {
        let policy = NavigationPolicy {
            backoff_base: Duration::from_millis(10),
            ..NavigationPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(10));
        assert_eq!(policy.backoff(2), Duration::from_millis(40));
    }
}
