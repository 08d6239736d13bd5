use super::*;

#[derive(Clone, Debug, Parser)]
pub struct Config {
    #[arg(
        long,
        env = "SWIMMER_RECONNECT_DELAY",
        help = "Wait <RECONNECT_DELAY> milliseconds before reconnecting after a socket error.",
        default_value = "1000"
    )]
    reconnect_delay: u64,
    #[arg(
        long,
        env = "SWIMMER_HEARTBEAT_INTERVAL",
        help = "Request a task every <HEARTBEAT_INTERVAL> milliseconds while connected.",
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    heartbeat_interval: u64,
    #[arg(
        long,
        env = "SWIMMER_IDLE_POLL",
        help = "Check for a task every <IDLE_POLL> milliseconds while idle.",
        default_value = "500",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    idle_poll: u64,
    #[arg(
        long,
        env = "SWIMMER_BATCH_SIZE",
        help = "Hash <BATCH_SIZE> nonces between clock checks.",
        default_value = "1000",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    batch_size: u32,
    #[arg(
        long,
        env = "SWIMMER_BATCH_WINDOW",
        help = "Yield to the network after <BATCH_WINDOW> milliseconds of hashing.",
        default_value = "500"
    )]
    batch_window: u64,
    #[arg(
        long,
        env = "SWIMMER_CONNECT_TIMEOUT",
        help = "Give up a connection attempt after <CONNECT_TIMEOUT> milliseconds.",
        default_value = "10000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    connect_timeout: u64,
    #[arg(
        long,
        env = "SWIMMER_WRITE_TIMEOUT",
        help = "Drop the connection when a write to the pool stalls for <WRITE_TIMEOUT> milliseconds.",
        default_value = "10000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    write_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["swimmer"])
    }
}

impl Config {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll)
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout)
    }
}
