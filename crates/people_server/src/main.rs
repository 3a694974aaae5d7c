use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use people_core::{
    people::{
        infrastructure::config::{DEFAULT_API_BASE, PeopleConfig},
        init_people_api,
    },
    store::memory::MemoryStore,
    transport::server::{DEFAULT_HTTP_PORT, serve},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "people-server")]
#[command(about = "HTTP service for the people resource")]
struct PeopleServerArgs {
    /// Server address to bind to
    #[arg(short, long, env = "PEOPLE_ADDRESS", default_value = "127.0.0.1")]
    address: IpAddr,

    /// Server port to bind to
    #[arg(short, long, env = "PEOPLE_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    port: u16,

    /// Base path of the people API
    #[arg(
        long,
        env = "PEOPLE_API_BASE",
        default_value = DEFAULT_API_BASE,
        value_parser = PeopleConfig::new
    )]
    api_base: PeopleConfig,

    /// Number of people to pre-populate the store with
    #[arg(long, env = "PEOPLE_SEED", default_value_t = 0)]
    seed: u32,
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(false)).init();

    let args = PeopleServerArgs::parse();

    let address = SocketAddr::new(args.address, args.port);
    let store = MemoryStore::new().with_seeded_people(args.seed);
    let router = init_people_api(args.api_base.clone(), store);

    let listener = TcpListener::bind(address).await?;
    info!("people API served at http://{}{}", address, args.api_base.api_base());

    serve(listener, router, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {}", e);
        }
    })
    .await;

    Ok(())
}
