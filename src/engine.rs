use super::*;

/// What one bounded batch of hashing produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    /// No task was held; nothing was hashed.
    Idle,
    /// The time window ran out without a solution.
    Searched { hashes: u64, hash_rate: HashRate },
    /// `header` hashes to `hash`, which meets the task target.
    Found {
        header: Header,
        hash: [u8; 32],
        hashes: u64,
        hash_rate: HashRate,
    },
}

impl Batch {
    pub fn hashes(&self) -> u64 {
        match self {
            Self::Idle => 0,
            Self::Searched { hashes, .. } | Self::Found { hashes, .. } => *hashes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Engine {
    chunk: u32,
    window: Duration,
}

impl Engine {
    /// `chunk` hashes run between clock checks; a batch yields once
    /// `window` has elapsed or a solution is found.
    pub fn new(chunk: u32, window: Duration) -> Self {
        Self {
            chunk: chunk.max(1),
            window,
        }
    }

    /// Searches the task current at call time, resuming from the counter
    /// the store holds. A replacement arriving later is only seen by the
    /// next batch.
    pub fn run_batch(&self, store: &mut TaskStore) -> Batch {
        let Some(task) = store.current() else {
            return Batch::Idle;
        };

        let target = task.target();

        let mut header = task.header().clone();
        header.set_nonce_raw(task.nonce());

        let state = store.state_mut();
        state.open_window();

        loop {
            for _ in 0..self.chunk {
                header.set_nonce_low(state.advance());

                let hash = header.hash();

                if target.is_met_by(&hash) {
                    let hashes = state.window_hashes();
                    return Batch::Found {
                        header,
                        hash,
                        hashes,
                        hash_rate: HashRate::measure(hashes, state.window_elapsed()),
                    };
                }
            }

            let elapsed = state.window_elapsed();

            if elapsed >= self.window {
                let hashes = state.window_hashes();
                return Batch::Searched {
                    hashes,
                    hash_rate: HashRate::measure(hashes, elapsed),
                };
            }
        }
    }
}
