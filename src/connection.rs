use {
    super::*,
    protocol::Outbound,
    tokio::{
        sync::mpsc::{self, error::TrySendError},
        task::JoinHandle,
    },
};

/// Frames waiting for the writer task before the pool counts as stalled.
const OUTBOUND_QUEUE: usize = 32;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConnectionError {
    #[snafu(display("Failed to resolve {endpoint}: {source}"))]
    Resolve {
        endpoint: String,
        source: io::Error,
    },

    #[snafu(display("{endpoint} resolved to no addresses"))]
    Unresolved { endpoint: String },

    #[snafu(display("Connection timeout: {source}"))]
    Timeout { source: tokio::time::error::Elapsed },

    #[snafu(display("Failed to connect to {address}: {source}"))]
    Connect {
        address: SocketAddr,
        source: io::Error,
    },

    #[snafu(display("IO error: {source}"))]
    Io { source: io::Error },

    #[snafu(display("Write to pool timed out: {source}"))]
    WriteTimeout { source: tokio::time::error::Elapsed },

    #[snafu(display("Pool is not reading: {queued} frames queued"))]
    Stalled { queued: usize },

    #[snafu(display("Pool writer stopped: {source}"))]
    Writer { source: tokio::task::JoinError },

    #[snafu(display("Pool closed the connection"))]
    Closed,

    #[snafu(display("Not connected"))]
    NotConnected,
}

/// Something the controller has to react to.
#[derive(Debug)]
pub enum Event {
    Connected(SocketAddr),
    /// The socket went away; a reconnect is already scheduled.
    Disconnected(ConnectionError),
    /// Time to send `REQUEST_TASK`.
    Heartbeat,
    /// Bytes of one socket read, treated as one frame.
    Frame(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

struct Connection {
    reader: FramedRead<OwnedReadHalf, BytesCodec>,
    outbound: mpsc::Sender<Vec<u8>>,
    writer: JoinHandle<Result<(), ConnectionError>>,
    heartbeat: Interval,
}

impl Connection {
    fn new(stream: TcpStream, heartbeat_interval: Duration, write_timeout: Duration) -> Self {
        let (reader, writer) = stream.into_split();

        let (outbound, rx) = mpsc::channel(OUTBOUND_QUEUE);

        let writer = tokio::spawn(Self::writer_task(BufWriter::new(writer), rx, write_timeout));

        let mut heartbeat = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            reader: FramedRead::new(reader, BytesCodec::new()),
            outbound,
            writer,
            heartbeat,
        }
    }

    /// Drains queued frames onto the socket. Ends with an error on the first
    /// write that fails or takes longer than `write_timeout`, and shuts the
    /// socket down once every sender is gone.
    async fn writer_task(
        mut writer: BufWriter<OwnedWriteHalf>,
        mut rx: mpsc::Receiver<Vec<u8>>,
        write_timeout: Duration,
    ) -> Result<(), ConnectionError> {
        while let Some(frame) = rx.recv().await {
            tokio::time::timeout(write_timeout, async {
                writer.write_all(&frame).await?;
                writer.flush().await
            })
            .await
            .context(WriteTimeoutSnafu)?
            .context(IoSnafu)?;
        }

        tokio::time::timeout(write_timeout, writer.shutdown())
            .await
            .context(WriteTimeoutSnafu)?
            .context(IoSnafu)
    }
}

enum State {
    Disconnected { retry_at: Instant },
    Connecting(BoxFuture<'static, Result<TcpStream, ConnectionError>>),
    Connected(Connection),
}

/// Owns the pool socket: `Connecting -> Connected -> Disconnected`, and back
/// to `Connecting` once the reconnect delay passes. Retries forever.
///
/// Writes never block the caller. They are queued for a writer task, and a
/// pool that stops reading shows up as a transport error.
pub struct ConnectionManager {
    address: Address,
    connect_timeout: Duration,
    endpoint: String,
    heartbeat_interval: Duration,
    metrics: Arc<Metrics>,
    reconnect_delay: Duration,
    state: State,
    write_timeout: Duration,
}

impl ConnectionManager {
    /// Starts in `Connecting`; nothing touches the network until
    /// [`next_event`](Self::next_event) is polled.
    pub fn new(endpoint: String, address: Address, config: &Config, metrics: Arc<Metrics>) -> Self {
        let state = State::Connecting(Self::connect(endpoint.clone(), config.connect_timeout()));

        Self {
            address,
            connect_timeout: config.connect_timeout(),
            endpoint,
            heartbeat_interval: config.heartbeat_interval(),
            metrics,
            reconnect_delay: config.reconnect_delay(),
            state,
            write_timeout: config.write_timeout(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        match self.state {
            State::Disconnected { .. } => ConnectionStatus::Disconnected,
            State::Connecting(_) => ConnectionStatus::Connecting,
            State::Connected(_) => ConnectionStatus::Connected,
        }
    }

    fn connect(
        endpoint: String,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<TcpStream, ConnectionError>> {
        Box::pin(async move {
            tokio::time::timeout(timeout, async {
                let address = tokio::net::lookup_host(&endpoint)
                    .await
                    .context(ResolveSnafu {
                        endpoint: endpoint.as_str(),
                    })?
                    .next()
                    .context(UnresolvedSnafu {
                        endpoint: endpoint.as_str(),
                    })?;

                let stream = TcpStream::connect(address)
                    .await
                    .context(ConnectSnafu { address })?;

                stream.set_nodelay(true).context(IoSnafu)?;

                Ok::<_, ConnectionError>(stream)
            })
            .await
            .context(TimeoutSnafu)
            .and_then(|result| result)
        })
    }

    fn schedule_reconnect(&mut self) {
        let previous = mem::replace(
            &mut self.state,
            State::Disconnected {
                retry_at: Instant::now() + self.reconnect_delay,
            },
        );

        if let State::Connected(connection) = previous {
            connection.writer.abort();
        }

        self.metrics.add_reconnect();
    }

    /// Drives the state machine until something happens. Cancel safe: all
    /// progress lives in `self.state`, so dropping this future between
    /// polls loses nothing.
    pub async fn next_event(&mut self) -> Event {
        loop {
            match &mut self.state {
                State::Disconnected { retry_at } => {
                    sleep_until(*retry_at).await;
                    debug!("Connecting to {}", self.endpoint);
                    self.state =
                        State::Connecting(Self::connect(self.endpoint.clone(), self.connect_timeout));
                }
                State::Connecting(connecting) => {
                    let result = connecting.await;

                    return match result.and_then(|stream| {
                        let peer = stream.peer_addr().context(IoSnafu)?;
                        Ok((stream, peer))
                    }) {
                        Ok((stream, peer)) => {
                            self.state = State::Connected(Connection::new(
                                stream,
                                self.heartbeat_interval,
                                self.write_timeout,
                            ));
                            Event::Connected(peer)
                        }
                        Err(err) => {
                            self.schedule_reconnect();
                            Event::Disconnected(err)
                        }
                    };
                }
                State::Connected(connection) => {
                    let event = tokio::select! {
                        frame = connection.reader.next() => match frame {
                            Some(Ok(bytes)) => Event::Frame(bytes.to_vec()),
                            Some(Err(source)) => Event::Disconnected(ConnectionError::Io { source }),
                            None => Event::Disconnected(ConnectionError::Closed),
                        },
                        written = &mut connection.writer => Event::Disconnected(match written {
                            Ok(Ok(())) => ConnectionError::Closed,
                            Ok(Err(err)) => err,
                            Err(source) => ConnectionError::Writer { source },
                        }),
                        _ = connection.heartbeat.tick() => Event::Heartbeat,
                    };

                    if let Event::Disconnected(_) = event {
                        self.schedule_reconnect();
                    }

                    return event;
                }
            }
        }
    }

    pub fn request_task(&mut self) -> Result<(), ConnectionError> {
        let frame = Outbound::RequestTask {
            address: &self.address,
        }
        .encode();

        self.send(frame)
    }

    pub fn submit(&mut self, header: &Header) -> Result<(), ConnectionError> {
        let frame = Outbound::BlockFound {
            address: &self.address,
            header,
        }
        .encode();

        self.send(frame)
    }

    /// Queues `frame` for the writer task. A full queue or a dead writer
    /// tears the socket down and schedules a reconnect.
    fn send(&mut self, frame: Vec<u8>) -> Result<(), ConnectionError> {
        let State::Connected(connection) = &self.state else {
            return NotConnectedSnafu.fail();
        };

        let result = connection.outbound.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => ConnectionError::Stalled {
                queued: OUTBOUND_QUEUE,
            },
            TrySendError::Closed(_) => ConnectionError::Closed,
        });

        if result.is_err() {
            self.schedule_reconnect();
        }

        result
    }

    /// Lets the writer flush what is queued, for at most one write timeout.
    pub async fn shutdown(self) {
        let State::Connected(Connection {
            outbound,
            mut writer,
            ..
        }) = self.state
        else {
            return;
        };

        drop(outbound);

        match tokio::time::timeout(self.write_timeout, &mut writer).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(err))) => debug!("Failed to flush pool socket: {err}"),
            Ok(Err(err)) => debug!("Pool writer stopped: {err}"),
            Err(_) => {
                writer.abort();
                debug!("Timed out flushing pool socket");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, tokio::net::TcpListener};

    fn address() -> Address {
        let mut bytes = [0x28u8; address::ADDRESS_LEN];
        let checksum = double_sha256(&bytes[..21]);
        bytes[21..].copy_from_slice(&checksum[..4]);
        bs58::encode(bytes).into_string().parse().unwrap()
    }

    fn config() -> Config {
        Config::try_parse_from([
            "swimmer",
            "--reconnect-delay",
            "50",
            "--heartbeat-interval",
            "20",
            "--connect-timeout",
            "1000",
        ])
        .unwrap()
    }

    async fn next(manager: &mut ConnectionManager) -> Event {
        tokio::time::timeout(Duration::from_secs(5), manager.next_event())
            .await
            .expect("timed out waiting for connection event")
    }

    #[test]
    fn starts_connecting() {
        let manager = ConnectionManager::new(
            "127.0.0.1:1".into(),
            address(),
            &config(),
            Arc::new(Metrics::new()),
        );
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn send_while_not_connected_fails_without_reconnect() {
        let metrics = Arc::new(Metrics::new());
        let mut manager =
            ConnectionManager::new("127.0.0.1:1".into(), address(), &config(), metrics.clone());

        assert!(matches!(
            manager.request_task(),
            Err(ConnectionError::NotConnected)
        ));
        assert_eq!(metrics.reconnects(), 0);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn connect_then_heartbeat() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();

        let mut manager = ConnectionManager::new(
            endpoint,
            address(),
            &config(),
            Arc::new(Metrics::new()),
        );

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        let (_socket, _) = accepted.unwrap();

        assert!(matches!(event, Event::Connected(_)));
        assert_eq!(manager.status(), ConnectionStatus::Connected);

        let event = next(&mut manager).await;
        assert!(matches!(event, Event::Heartbeat), "{event:?}");
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn closed_socket_schedules_one_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        let metrics = Arc::new(Metrics::new());

        let mut manager = ConnectionManager::new(endpoint, address(), &config(), metrics.clone());

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        assert!(matches!(event, Event::Connected(_)));
        drop(accepted.unwrap());

        let event = loop {
            match next(&mut manager).await {
                Event::Heartbeat => {
                    let _ = manager.request_task();
                    if manager.status() == ConnectionStatus::Disconnected {
                        break None;
                    }
                }
                event => break Some(event),
            }
        };

        if let Some(event) = event {
            assert!(matches!(event, Event::Disconnected(_)), "{event:?}");
        }
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(metrics.reconnects(), 1);

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        accepted.unwrap();
        assert!(matches!(event, Event::Connected(_)));
        assert_eq!(metrics.reconnects(), 1);
    }

    #[tokio::test]
    async fn refused_connection_schedules_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        drop(listener);

        let metrics = Arc::new(Metrics::new());
        let mut manager = ConnectionManager::new(endpoint, address(), &config(), metrics.clone());

        assert!(matches!(
            next(&mut manager).await,
            Event::Disconnected(_)
        ));
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(metrics.reconnects(), 1);
    }

    #[tokio::test]
    async fn frames_are_delivered_per_read() {
        use tokio::io::AsyncWriteExt;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();

        let mut manager = ConnectionManager::new(
            endpoint,
            address(),
            &Config::try_parse_from(["swimmer", "--heartbeat-interval", "60000"]).unwrap(),
            Arc::new(Metrics::new()),
        );

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        assert!(matches!(event, Event::Connected(_)));
        let (mut socket, _) = accepted.unwrap();

        socket.write_all(&[0xf0]).await.unwrap();

        let Event::Frame(frame) = next(&mut manager).await else {
            panic!("expected a frame");
        };
        assert_eq!(frame, vec![0xf0]);
    }

    #[tokio::test]
    async fn queued_frames_reach_the_pool() {
        use tokio::io::AsyncReadExt;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();

        let mut manager = ConnectionManager::new(
            endpoint,
            address(),
            &Config::try_parse_from(["swimmer", "--heartbeat-interval", "60000"]).unwrap(),
            Arc::new(Metrics::new()),
        );

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        assert!(matches!(event, Event::Connected(_)));
        let (mut socket, _) = accepted.unwrap();

        let header = Header::new(vec![0x5a; header::MIN_LEN]).unwrap();
        manager.request_task().unwrap();
        manager.submit(&header).unwrap();

        let mut received = vec![0; 2 * (1 + address::ADDRESS_LEN) + header.len()];
        tokio::time::timeout(Duration::from_secs(5), socket.read_exact(&mut received))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(received[0], u8::from(protocol::Tag::RequestTask));
        assert_eq!(received[26], u8::from(protocol::Tag::BlockFound));
        assert_eq!(&received[27..52], address().as_bytes());
        assert_eq!(&received[52..], header.as_bytes());
    }

    #[tokio::test]
    async fn pool_that_stops_reading_is_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        let metrics = Arc::new(Metrics::new());

        let mut manager = ConnectionManager::new(
            endpoint,
            address(),
            &Config::try_parse_from([
                "swimmer",
                "--heartbeat-interval",
                "60000",
                "--write-timeout",
                "200",
            ])
            .unwrap(),
            metrics.clone(),
        );

        let (event, accepted) = tokio::join!(next(&mut manager), listener.accept());
        assert!(matches!(event, Event::Connected(_)));
        let (_socket, _) = accepted.unwrap();

        let header = Header::new(vec![0x5a; 1 << 16]).unwrap();

        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if manager.submit(&header).is_err() {
                    break;
                }

                tokio::select! {
                    event = manager.next_event() => {
                        assert!(matches!(event, Event::Disconnected(_)), "{event:?}");
                        break;
                    }
                    _ = tokio::task::yield_now() => {}
                }
            }
        })
        .await
        .expect("stalled pool was never detected");

        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(metrics.reconnects(), 1);
    }
}
