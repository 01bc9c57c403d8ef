use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use dnsreg::server::{self, Config};
use dnsreg::Registry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dnsreg")]
#[command(about = "Authoritative DNS server with a UDP registration endpoint")]
struct Cli {
    /// Bind address for both endpoints
    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// UDP port for DNS queries
    #[arg(short = 'd', long, default_value_t = 53)]
    dns_port: u16,

    /// UDP port for registration requests
    #[arg(short = 'r', long, default_value_t = 8080)]
    registration_port: u16,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = Config {
        query_addr: SocketAddr::new(cli.bind, cli.dns_port),
        registration_addr: SocketAddr::new(cli.bind, cli.registration_port),
    };

    server::run(config, Registry::seeded()).await
}
