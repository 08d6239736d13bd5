use {
    anyhow::Error,
    arguments::Arguments,
    bitcoin::hashes::{Hash, sha256d},
    byteorder::{BigEndian, ByteOrder},
    clap::Parser,
    derive_more::Display,
    futures::{future::BoxFuture, stream::StreamExt},
    snafu::{OptionExt, ResultExt, Snafu},
    std::{
        env,
        fmt::{self, Formatter},
        io,
        mem,
        net::SocketAddr,
        process,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    },
    tokio::{
        io::{AsyncWriteExt, BufWriter},
        net::{
            TcpStream,
            tcp::{OwnedReadHalf, OwnedWriteHalf},
        },
        runtime,
        time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until},
    },
    tokio_util::{
        codec::{BytesCodec, FramedRead},
        sync::CancellationToken,
    },
    tracing::{debug, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

pub use {
    address::{Address, AddressError},
    config::Config,
    connection::{ConnectionError, ConnectionManager, ConnectionStatus, Event},
    controller::Controller,
    engine::{Batch, Engine},
    hash_rate::HashRate,
    header::Header,
    metrics::Metrics,
    nonce::NonceCounter,
    target::Target,
    task::{MiningState, Task, TaskStore},
};

pub mod address;
mod arguments;
pub mod config;
pub mod connection;
pub mod controller;
pub mod engine;
mod hash_rate;
pub mod header;
mod logs;
mod metrics;
mod nonce;
pub mod protocol;
mod signal;
mod target;
pub mod task;

type Result<T = (), E = Error> = std::result::Result<T, E>;

/// `SHA256(SHA256(data))`, the proof-of-work hash and the address checksum.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).to_byte_array()
}

pub fn main() {
    let guard = logs::init();

    let args = Arguments::parse();

    let code = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime")
        .block_on(async {
            let cancel_token = signal::setup_signal_handler();

            match args.run(cancel_token).await {
                Err(err) => {
                    eprintln!("error: {err}");

                    for (i, cause) in err.chain().skip(1).enumerate() {
                        if i == 0 {
                            eprintln!();
                            eprintln!("because:");
                        }
                        eprintln!("- {cause}");
                    }

                    if env::var_os("RUST_BACKTRACE")
                        .map(|val| val == "1")
                        .unwrap_or_default()
                    {
                        eprintln!();
                        eprintln!("{}", err.backtrace());
                    }

                    1
                }
                Ok(()) => 0,
            }
        });

    drop(guard);

    process::exit(code);
}
