use certificate_portal::application::{SortDirection, StatusFilter, ViewControls, WalletSession};
use certificate_portal::config::ClientConfig;
use certificate_portal::handlers::{self, IssueRequest};
use certificate_portal::infrastructure::api::HttpCertificateApi;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "certportal", version, about = "NFT certificate issuance client")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List certificates
    List {
        /// Case-insensitive match on recipient or course name
        #[arg(long, default_value = "")]
        search: String,
        /// all, active or revoked
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
        /// asc (oldest first) or desc (newest first)
        #[arg(long, default_value = "desc")]
        sort: SortDirection,
    },
    /// Show one certificate and its metadata
    Show { id: String },
    /// Revoke a certificate (irreversible)
    Revoke {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Issue a new certificate
    Issue {
        #[arg(long)]
        recipient_name: String,
        #[arg(long)]
        recipient_address: String,
        #[arg(long)]
        course_name: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        issue_date: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        image: PathBuf,
    },
    /// Show backend settings
    Settings,
    /// Show the backend's network
    Network,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let api = HttpCertificateApi::new(&config);
    tracing::info!(api = %api.base_url(), "using certificate backend");

    let output = match cli.cmd {
        Cmd::List {
            search,
            filter,
            sort,
        } => {
            let session = contract_session(&api, &config).await?;
            let controls = ViewControls {
                search,
                filter_by: filter,
                sort,
            };
            handlers::handle_list(&api, &session, controls).await?
        }
        Cmd::Show { id } => {
            let session = contract_session(&api, &config).await?;
            handlers::handle_show(&api, &session, &config.ipfs_gateway, &id).await?
        }
        Cmd::Revoke { id, yes } => {
            let session = contract_session(&api, &config).await?;
            handlers::handle_revoke(&api, &session, &config.ipfs_gateway, &id, yes).await?
        }
        Cmd::Issue {
            recipient_name,
            recipient_address,
            course_name,
            issue_date,
            description,
            image,
        } => {
            let session = contract_session(&api, &config).await?;
            let request = IssueRequest {
                recipient_name,
                recipient_address,
                course_name,
                issue_date,
                description,
                image: handlers::read_image(&image)?,
            };
            let today = chrono::Local::now().date_naive();
            handlers::handle_issue(&api, &session, request, today).await?
        }
        Cmd::Settings => handlers::handle_settings(&api).await?,
        Cmd::Network => handlers::handle_network(&api).await?,
    };

    print!("{}", output);
    Ok(())
}

/// Session bound to the backend's contract, for commands that read or write certificates.
async fn contract_session(
    api: &HttpCertificateApi,
    config: &ClientConfig,
) -> Result<WalletSession, Box<dyn std::error::Error>> {
    let mut session = handlers::open_session(config)?;
    handlers::ensure_contract(api, &mut session).await;
    Ok(session)
}
