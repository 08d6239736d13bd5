use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
};

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Mine for a Hidecoin address through a pool",
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[arg(
        value_name = "HOST:PORT",
        help = "Connect to pool at <HOST:PORT>.",
        value_parser = parse_endpoint
    )]
    pub(crate) pool: String,
    #[arg(value_name = "ADDRESS", help = "Mine for <ADDRESS>.")]
    pub(crate) address: Address,
    #[command(flatten)]
    pub(crate) config: Config,
}

fn parse_endpoint(s: &str) -> Result<String, String> {
    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("`{s}` is not of the form HOST:PORT"))?;

    if host.is_empty() {
        return Err(format!("`{s}` is missing a host"));
    }

    port.parse::<u16>()
        .map_err(|err| format!("`{s}` has an invalid port: {err}"))?;

    Ok(s.to_string())
}

impl Arguments {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        info!("Connecting to {} as {}", self.pool, self.address);

        let controller = Controller::new(self.pool, self.address, &self.config);

        controller.run(cancel_token).await
    }
}
