use super::*;

pub struct Metrics {
    hashes: AtomicU64,
    blocks_found: AtomicU64,
    blocks_accepted: AtomicU64,
    reconnects: AtomicU64,
    started: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            hashes: AtomicU64::new(0),
            blocks_found: AtomicU64::new(0),
            blocks_accepted: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub(crate) fn add_hashes(&self, hashes: u64) {
        self.hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub(crate) fn add_block_found(&self) {
        self.blocks_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_block_accepted(&self) {
        self.blocks_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub fn blocks_found(&self) -> u64 {
        self.blocks_found.load(Ordering::Relaxed)
    }

    pub fn blocks_accepted(&self) -> u64 {
        self.blocks_accepted.load(Ordering::Relaxed)
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Average over the whole uptime.
    pub fn hash_rate(&self) -> HashRate {
        HashRate::measure(self.hashes(), self.uptime())
    }

    pub fn status_line(&self) -> String {
        format!(
            "hashrate={}  found={}  accepted={}  reconnects={}  uptime={}s",
            self.hash_rate(),
            self.blocks_found(),
            self.blocks_accepted(),
            self.reconnects(),
            self.uptime().as_secs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metrics_starts_at_zero() {
        let metrics = Metrics::new();
        assert_eq!(metrics.hashes(), 0);
        assert_eq!(metrics.blocks_found(), 0);
        assert_eq!(metrics.blocks_accepted(), 0);
        assert_eq!(metrics.reconnects(), 0);
    }

    #[test]
    fn hash_count_increments() {
        let metrics = Metrics::new();
        metrics.add_hashes(1000);
        metrics.add_hashes(500);
        assert_eq!(metrics.hashes(), 1500);
    }

    #[test]
    fn counters_increment() {
        let metrics = Metrics::new();
        metrics.add_block_found();
        metrics.add_block_found();
        metrics.add_block_accepted();
        metrics.add_reconnect();
        assert_eq!(metrics.blocks_found(), 2);
        assert_eq!(metrics.blocks_accepted(), 1);
        assert_eq!(metrics.reconnects(), 1);
    }

    #[test]
    fn hash_rate_is_finite() {
        let metrics = Metrics::new();
        metrics.add_hashes(100_000);
        let rate = metrics.hash_rate();
        assert!(rate.0 > 0.0, "hashrate should be positive: {rate}");
        assert!(rate.0.is_finite(), "hashrate should be finite: {rate}");
    }

    #[test]
    fn status_line_contains_all_fields() {
        let metrics = Metrics::new();
        metrics.add_hashes(1000);
        metrics.add_block_found();

        let line = metrics.status_line();
        assert!(line.contains("hashrate="), "missing hashrate: {line}");
        assert!(line.contains("H/s"), "missing H/s unit: {line}");
        assert!(line.contains("found=1"), "missing found: {line}");
        assert!(line.contains("accepted=0"), "missing accepted: {line}");
        assert!(line.contains("reconnects=0"), "missing reconnects: {line}");
        assert!(line.contains("uptime="), "missing uptime: {line}");
    }
}
