use {
    super::*,
    protocol::{FrameError, Inbound},
};

/// Runs the mining loop and the pool connection on one task.
pub struct Controller {
    connection: ConnectionManager,
    engine: Engine,
    idle_poll: Duration,
    metrics: Arc<Metrics>,
    store: TaskStore,
}

impl Controller {
    pub fn new(endpoint: String, address: Address, config: &Config) -> Self {
        let metrics = Arc::new(Metrics::new());

        Self {
            connection: ConnectionManager::new(endpoint, address, config, metrics.clone()),
            engine: Engine::new(config.batch_size(), config.batch_window()),
            idle_poll: config.idle_poll(),
            metrics,
            store: TaskStore::new(),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Network events win over hashing. A batch only starts once nothing
    /// else is ready, and the loop yields after every batch so the I/O
    /// driver and the socket writer get a turn. No branch awaits the pool.
    pub async fn run(mut self, cancel_token: CancellationToken) -> Result {
        let mut idle_until: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    info!("Shutting down");
                    break;
                }
                event = self.connection.next_event() => {
                    if self.handle_event(event) {
                        idle_until = None;
                    }
                }
                _ = sleep_until(idle_until.unwrap_or_else(Instant::now)), if idle_until.is_some() => {
                    idle_until = None;
                }
                _ = std::future::ready(()), if idle_until.is_none() => {
                    if !self.mine() {
                        idle_until = Some(Instant::now() + self.idle_poll);
                    }

                    tokio::task::yield_now().await;
                }
            }
        }

        info!("{}", self.metrics.status_line());

        self.connection.shutdown().await;

        Ok(())
    }

    /// Returns false when there was nothing to mine.
    fn mine(&mut self) -> bool {
        match self.engine.run_batch(&mut self.store) {
            Batch::Idle => false,
            Batch::Searched { hashes, hash_rate } => {
                self.metrics.add_hashes(hashes);
                info!("Mining at {hash_rate}");
                true
            }
            Batch::Found {
                header,
                hash,
                hashes,
                hash_rate,
            } => {
                self.metrics.add_hashes(hashes);
                self.metrics.add_block_found();

                info!("Mining at {hash_rate}");
                info!(
                    "Found block: nonce={} hash={}",
                    header.nonce_low(),
                    hex::encode(hash)
                );

                match self.connection.submit(&header) {
                    Ok(()) => debug!("Block queued for submission"),
                    Err(err) => warn!("Dropping found block: {err}"),
                }

                true
            }
        }
    }

    /// Returns true when a new task was stored.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Connected(peer) => {
                info!("Connected to pool at {peer}");
                false
            }
            Event::Disconnected(err) => {
                warn!("Pool connection lost: {err}. Reconnecting");
                false
            }
            Event::Heartbeat => {
                if let Err(err) = self.connection.request_task() {
                    warn!("Failed to request task: {err}");
                }
                false
            }
            Event::Frame(frame) => match Inbound::decode(&frame) {
                Ok(inbound) => self.handle_inbound(inbound),
                Err(err) => {
                    self.drop_frame(&frame, err);
                    false
                }
            },
        }
    }

    fn handle_inbound(&mut self, inbound: Inbound) -> bool {
        match inbound {
            Inbound::TakeTask(task) => {
                let target = task.target();
                let replaced = self.store.apply(task);
                if replaced {
                    info!("Current task updated: target={target}");
                }
                replaced
            }
            Inbound::Suspend => {
                self.store.clear();
                info!("Mining suspended");
                false
            }
            Inbound::Accepted => {
                self.metrics.add_block_accepted();
                info!("Block accepted");
                false
            }
            Inbound::Error => {
                warn!("Pool reported an error");
                false
            }
        }
    }

    fn drop_frame(&self, frame: &[u8], err: FrameError) {
        warn!("Dropping malformed frame: {err}");
        debug!("Dropped frame: {}", hex::encode(frame));
    }
}
