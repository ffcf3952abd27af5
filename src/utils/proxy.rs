//! Rotating proxy pool shared by every worker in a run.

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Per-proxy bookkeeping.
#[derive(Debug, Clone)]
struct ProxyState {
    address: String,
    is_failed: bool,
    success_count: u64,
    failure_count: u64,
}

impl ProxyState {
    fn new(address: String) -> Self {
        Self {
            address,
            is_failed: false,
            success_count: 0,
            failure_count: 0,
        }
    }
}

#[derive(Debug)]
struct RotatorState {
    proxies: Vec<ProxyState>,
    current_index: usize,
    uses_since_rotation: u32,
    rotations: u64,
}

/// Observability snapshot for [`ProxyRotator::stats`].
#[derive(Debug, Clone)]
pub struct ProxyStats {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
    pub rotations: u64,
    pub per_proxy: Vec<ProxyReport>,
}

#[derive(Debug, Clone)]
pub struct ProxyReport {
    pub address: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub success_rate: f64,
}

/// Hands out proxy addresses round-robin, advancing after a fixed number of
/// uses or immediately when the current proxy is reported failed. The whole
/// state sits behind one mutex because every worker touches it.
pub struct ProxyRotator {
    state: Mutex<RotatorState>,
    rotation_threshold: u32,
}

impl ProxyRotator {
    pub fn new(addresses: &[String], rotation_threshold: u32) -> Self {
        let proxies = addresses
            .iter()
            .map(|a| ProxyState::new(a.clone()))
            .collect();
        Self {
            state: Mutex::new(RotatorState {
                proxies,
                current_index: 0,
                uses_since_rotation: 0,
                rotations: 0,
            }),
            rotation_threshold,
        }
    }

    /// The proxy to use for the next outbound request, or `None` when the
    /// pool is empty. Rotates once the current proxy has served the
    /// configured number of uses.
    pub fn get_proxy(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.proxies.is_empty() {
            return None;
        }

        // A fully-failed pool is retried from scratch rather than treated as
        // permanently exhausted. Known tradeoff: dead proxies get re-hit.
        if state.proxies.iter().all(|p| p.is_failed) {
            warn!(target: "proxy", "All proxies marked failed, resetting the pool");
            for proxy in &mut state.proxies {
                proxy.is_failed = false;
            }
        }

        if state.uses_since_rotation >= self.rotation_threshold {
            advance(&mut state);
        }

        state.uses_since_rotation += 1;
        let address = state.proxies[state.current_index].address.clone();
        Some(address)
    }

    /// Marks a proxy failed and, when it is the one currently being handed
    /// out, rotates away from it at once.
    pub fn mark_failed(&self, address: &str) {
        let mut state = self.state.lock();
        let Some(pos) = state.proxies.iter().position(|p| p.address == address) else {
            return;
        };
        state.proxies[pos].is_failed = true;
        state.proxies[pos].failure_count += 1;
        debug!(target: "proxy", "Proxy {} marked failed", address);

        if pos == state.current_index && !state.proxies.iter().all(|p| p.is_failed) {
            advance(&mut state);
        }
    }

    /// Zeroes the use counter so the current proxy starts a fresh rotation
    /// window. Called at each batch start.
    pub fn reset_usage(&self) {
        let mut state = self.state.lock();
        state.uses_since_rotation = 0;
    }

    pub fn mark_success(&self, address: &str) {
        let mut state = self.state.lock();
        if let Some(proxy) = state.proxies.iter_mut().find(|p| p.address == address) {
            proxy.success_count += 1;
        }
    }

    pub fn stats(&self) -> ProxyStats {
        let state = self.state.lock();
        let failed = state.proxies.iter().filter(|p| p.is_failed).count();
        ProxyStats {
            total: state.proxies.len(),
            working: state.proxies.len() - failed,
            failed,
            rotations: state.rotations,
            per_proxy: state
                .proxies
                .iter()
                .map(|p| {
                    let attempts = p.success_count + p.failure_count;
                    ProxyReport {
                        address: p.address.clone(),
                        success_count: p.success_count,
                        failure_count: p.failure_count,
                        success_rate: if attempts == 0 {
                            0.0
                        } else {
                            p.success_count as f64 / attempts as f64
                        },
                    }
                })
                .collect(),
        }
    }
}

/// Moves the cursor to the next non-failed proxy and resets the use counter.
fn advance(state: &mut RotatorState) {
    let len = state.proxies.len();
    for step in 1..=len {
        let candidate = (state.current_index + step) % len;
        if !state.proxies[candidate].is_failed {
            state.current_index = candidate;
            break;
        }
    }
    state.uses_since_rotation = 0;
    state.rotations += 1;
    debug!(
        target: "proxy",
        "Rotated to proxy {}", state.proxies[state.current_index].address
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("http://proxy{}:8080", i)).collect()
    }

    #[test]
    fn empty_pool_yields_none() {
        let rotator = ProxyRotator::new(&[], 5);
        assert_eq!(rotator.get_proxy(), None);
    }

    #[test]
    fn five_uses_with_threshold_two_rotate_exactly_twice() {
        let rotator = ProxyRotator::new(&pool(3), 2);
        for _ in 0..5 {
            rotator.get_proxy().unwrap();
        }
        assert_eq!(rotator.stats().rotations, 2);
    }

    #[test]
    fn rotation_advances_round_robin() {
        let rotator = ProxyRotator::new(&pool(3), 1);
        let a = rotator.get_proxy().unwrap();
        let b = rotator.get_proxy().unwrap();
        let c = rotator.get_proxy().unwrap();
        let d = rotator.get_proxy().unwrap();
        assert_eq!(a, "http://proxy0:8080");
        assert_eq!(b, "http://proxy1:8080");
        assert_eq!(c, "http://proxy2:8080");
        assert_eq!(d, "http://proxy0:8080");
    }

    #[test]
    fn failed_proxy_is_skipped_until_pool_resets() {
        let rotator = ProxyRotator::new(&pool(2), 1);
        let first = rotator.get_proxy().unwrap();
        rotator.mark_failed(&first);

        // Rotated away immediately, subsequent uses avoid the failed entry.
        let second = rotator.get_proxy().unwrap();
        assert_ne!(second, first);
        let third = rotator.get_proxy().unwrap();
        assert_ne!(third, first);

        rotator.mark_failed(&second);
        // Whole pool failed: reset and keep serving.
        assert!(rotator.get_proxy().is_some());
        assert_eq!(rotator.stats().failed, 0);
    }

    #[test]
    fn usage_reset_restarts_the_rotation_window() {
        let rotator = ProxyRotator::new(&pool(2), 2);
        let first = rotator.get_proxy().unwrap();
        rotator.get_proxy().unwrap();

        // Counter is at the threshold; without a reset the next use would
        // rotate to the second proxy.
        rotator.reset_usage();
        assert_eq!(rotator.get_proxy().unwrap(), first);
        assert_eq!(rotator.stats().rotations, 0);
    }

    #[test]
    fn stats_track_success_rate() {
        let rotator = ProxyRotator::new(&pool(1), 5);
        let addr = rotator.get_proxy().unwrap();
        rotator.mark_success(&addr);
        rotator.mark_success(&addr);

        let stats = rotator.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.per_proxy[0].success_count, 2);
        assert!((stats.per_proxy[0].success_rate - 1.0).abs() < f64::EPSILON);
    }
}
