use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use catalogue_tools::{
    config::Config,
    errors::Result,
    file_format::catalogue::load_catalogue,
    logging::init_logging,
    server::{serve, CatalogueService},
};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "can't listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("ctrl-c received, shutting down");
}

/// Serve catalogue trees over HTTP.  Every request is independent: the
/// view-state comes in with the request and goes back out with the response.
#[derive(Debug, Parser)]
#[clap(name = "hierarchy-server", version)]
struct ServerOpts {
    /// TOML config file layered over the built-in defaults.
    #[clap(long, value_parser, env = "HIERARCHY_CONFIG")]
    config: Option<PathBuf>,

    /// Catalogue rows to serve; overrides `server.catalogue` from the config.
    #[clap(long, value_parser, env = "HIERARCHY_CATALOGUE")]
    catalogue: Option<PathBuf>,

    /// Address to listen on; overrides `server.listen` from the config.
    #[clap(long, value_parser)]
    listen: Option<SocketAddr>,
}

fn load_service(opts: &ServerOpts) -> Result<(CatalogueService, Option<SocketAddr>, String)> {
    let config = Config::load(opts.config.as_deref())?;
    let catalogue = opts
        .catalogue
        .clone()
        .or_else(|| config.server.catalogue.clone());

    let rows = match catalogue {
        Some(path) => load_catalogue(&path)?,
        None => {
            error!("no catalogue given; serving an empty tree");
            vec![]
        }
    };

    let service = CatalogueService {
        engine: config.engine(),
        rows,
    };
    Ok((service, opts.listen, config.server.listen))
}

#[tokio::main]
async fn main() {
    init_logging();
    let opts = ServerOpts::parse();

    let (service, listen_override, configured_listen) = match load_service(&opts) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("hierarchy-server: {}", err);
            exit(1);
        }
    };

    let addr = match listen_override {
        Some(addr) => addr,
        None => match configured_listen.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                eprintln!("hierarchy-server: bad listen address {:?}: {}", configured_listen, err);
                exit(1);
            }
        },
    };

    info!(%addr, rows = service.rows.len(), "serving catalogue");
    if let Err(err) = serve(addr, Arc::new(service), shutdown_signal()).await {
        eprintln!("hierarchy-server: {}", err);
        exit(1);
    }
}
