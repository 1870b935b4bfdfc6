use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_coach::{
    create_router, AppState, Config, Credential, CredentialBroker, CredentialSource, InterviewType,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interview-coach", about = "Spoken interview rehearsal services")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/interview-coach")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the credential endpoint
    Serve,
    /// Request one credential from the configured endpoint and print it
    FetchCredential {
        #[arg(long, value_enum)]
        interview_type: InterviewType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Interview Coach v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::FetchCredential { interview_type } => fetch_credential(cfg, interview_type).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    if cfg.upstream.api_key.is_none() {
        info!("No upstream API key, clients will be told to connect directly");
    }

    let app = create_router(AppState::new(cfg)?);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Credential endpoint listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

async fn fetch_credential(cfg: Config, interview_type: InterviewType) -> Result<()> {
    let broker = CredentialBroker::new(&cfg.credentials)?;
    info!("Fetching credential from {}", broker.endpoint());

    match broker.fetch_credential(interview_type).await? {
        Credential::SignedUrl(url) => println!("signed url: {}", url),
        Credential::DirectUse => println!(
            "direct use, agent id: {}",
            cfg.agents.resolve(interview_type)
        ),
    }

    Ok(())
}
