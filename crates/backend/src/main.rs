pub mod api;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;

use clap::Parser;

/// Backend чат-виджета ADSO
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Print the models available for the configured API key and exit
    #[arg(long)]
    list_models: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    let cli = Cli::parse();

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;

    if cli.list_models {
        for model in domain::a001_chat::service::list_models(&config.llm).await? {
            println!("{}", model);
        }
        return Ok(());
    }

    let service = domain::a001_chat::service::build_from_config(&config.llm).await?;
    domain::a001_chat::service::initialize(service)?;

    let static_dir = shared::config::resolve_path(&config.server.static_dir);
    tracing::info!("Serving static files from {}", static_dir.display());
    let app = routes::configure_routes(&static_dir.to_string_lossy());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid server address {}:{}: {}",
                config.server.host,
                config.server.port,
                e
            )
        })?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        assert!(!Cli::try_parse_from(["backend"]).unwrap().list_models);
        assert!(Cli::try_parse_from(["backend", "--list-models"]).unwrap().list_models);
        assert!(Cli::try_parse_from(["backend", "--bogus"]).is_err());
    }
}
