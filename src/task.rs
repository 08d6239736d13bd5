use super::*;

/// One pool-assigned unit of work. Never patched in place; a differing
/// assignment replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    nonce: [u8; 8],
    target: Option<Target>,
    header: Header,
}

impl Task {
    pub fn new(nonce: [u8; 8], target: Option<Target>, header: Header) -> Self {
        Self {
            nonce,
            target,
            header,
        }
    }

    pub fn nonce(&self) -> &[u8; 8] {
        &self.nonce
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The assigned target, falling back to the one embedded in the header.
    pub fn target(&self) -> Target {
        self.target.unwrap_or_else(|| self.header.embedded_target())
    }
}

/// Progress through the nonce space of the current task, plus the
/// hash-rate measurement window of the running batch.
#[derive(Debug, Clone, Copy)]
pub struct MiningState {
    counter: NonceCounter,
    window_start: Instant,
    window_start_counter: NonceCounter,
}

impl Default for MiningState {
    fn default() -> Self {
        Self {
            counter: NonceCounter::ZERO,
            window_start: Instant::now(),
            window_start_counter: NonceCounter::ZERO,
        }
    }
}

impl MiningState {
    pub fn counter(&self) -> NonceCounter {
        self.counter
    }

    pub(crate) fn advance(&mut self) -> NonceCounter {
        self.counter = self.counter.next();
        self.counter
    }

    pub(crate) fn open_window(&mut self) {
        self.window_start = Instant::now();
        self.window_start_counter = self.counter;
    }

    pub(crate) fn window_elapsed(&self) -> Duration {
        self.window_start.elapsed()
    }

    pub(crate) fn window_hashes(&self) -> u64 {
        self.counter.distance_from(self.window_start_counter)
    }

    #[cfg(test)]
    pub(crate) fn seek(&mut self, counter: NonceCounter) {
        self.counter = counter;
    }
}

/// Holds the single active task. Owned by the controller and lent to the
/// engine one batch at a time.
#[derive(Debug, Default)]
pub struct TaskStore {
    task: Option<Arc<Task>>,
    state: MiningState,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task and resets mining progress, unless `task` is
    /// byte-for-byte identical to the one already held. Returns whether the
    /// task was replaced.
    pub fn apply(&mut self, task: Task) -> bool {
        if self.task.as_deref() == Some(&task) {
            return false;
        }

        self.task = Some(Arc::new(task));
        self.state = MiningState::default();

        true
    }

    pub fn clear(&mut self) {
        self.task = None;
    }

    pub fn current(&self) -> Option<Arc<Task>> {
        self.task.clone()
    }

    pub fn state(&self) -> &MiningState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut MiningState {
        &mut self.state
    }
}
