// crates/edge/src/cli.rs

use crate::settings::load_settings;
use crate::Error;
use adapt::{build_app, HttpMailer, Mailer, Site};
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use serve::client::{CmsClient, ContentSource};
use serve::preview::{resolve_preview_link, PAGE_UID};
use serve::render::ComponentRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::{path::PathBuf, process::ExitCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, Error>;

/// Vitrine CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
        Commands::PreviewLink(cmd) => do_preview_link(cmd).await,
    };

    result.map_or_else(
        |e| {
            error!("Vitrine failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
        |_| {
            info!("Vitrine finished");
            ExitCode::SUCCESS
        },
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> Result<()> {
    // parse settings file -> does the settings file exist?  If yes, parse it
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start.dir)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // inject dependencies -> CMS client, mailer, and block templates
    let then = Utc::now();
    let process = process.inject_dependencies()?;
    info!(
        "Dependencies injected in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // build the router and bind the listener
    let then = Utc::now();
    let process = process.start_server().await?;
    info!(
        "Server started in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.wait().await
}

#[tracing::instrument(skip_all)]
async fn do_preview_link(cmd: PreviewLinkCmd) -> Result<()> {
    let settings = load_settings(&cmd.dir)?;
    let client = CmsClient::new(&settings.cms)?;
    let link = resolve_preview_link(
        &client,
        settings.site.base(),
        settings.preview.secret.as_ref(),
        &cmd.uid,
        &cmd.document_id,
        &cmd.locale,
        &cmd.status,
    )
    .await?;
    match link {
        Some(link) => println!("{link}"),
        None => info!(uid = %cmd.uid, "no public page for this content type"),
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "Localized site renderer for a headless CMS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site configured in the specified directory
    Start(StartCmd),
    /// Print the preview URL for a CMS entry
    PreviewLink(PreviewLinkCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Site directory holding settings.toml (or set VITRINE_DIR)
    #[arg(
        value_name = "DIR",
        env = "VITRINE_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PreviewLinkCmd {
    /// Site directory holding settings.toml (or set VITRINE_DIR)
    #[arg(
        long,
        value_name = "DIR",
        env = "VITRINE_DIR",
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,

    /// Content type id, e.g. api::page.page
    #[arg(long, default_value = PAGE_UID)]
    pub uid: String,

    #[arg(long)]
    pub document_id: String,

    #[arg(long)]
    pub locale: String,

    /// draft or published
    #[arg(long, default_value = "draft")]
    pub status: String,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    dir: PathBuf,
    settings: Settings,
}

struct DependenciesInjected {
    settings: Settings,
    source: Arc<dyn ContentSource>,
    mailer: Arc<dyn Mailer>,
    components: ComponentRegistry,
}

struct ServerStarted {
    addr: SocketAddr,
    server: JoinHandle<std::io::Result<()>>,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for DependenciesInjected {}
impl ProcessState for ServerStarted {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    /// Load settings from `<dir>/settings.toml` plus `VITRINE__*` overrides.
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(dir: PathBuf) -> Result<StartProcess<SettingsLoaded>> {
        let settings = load_settings(&dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { dir, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn inject_dependencies(self) -> Result<StartProcess<DependenciesInjected>> {
        let SettingsLoaded { dir, settings } = self.state;

        let source: Arc<dyn ContentSource> = Arc::new(CmsClient::new(&settings.cms)?);
        let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(&settings.mail)?);

        // relative component directories are taken from the site directory
        let components_dir = settings.site.components_dir.as_ref().map(|d| dir.join(d));
        let components = ComponentRegistry::load(components_dir.as_deref())?;

        Ok(StartProcess {
            state: DependenciesInjected {
                settings,
                source,
                mailer,
                components,
            },
        })
    }
}

impl StartProcess<DependenciesInjected> {
    #[tracing::instrument(skip_all)]
    async fn start_server(self) -> Result<StartProcess<ServerStarted>> {
        let DependenciesInjected {
            settings,
            source,
            mailer,
            components,
        } = self.state;

        let addr = SocketAddr::new(settings.server.ip, settings.server.port);
        let site = Site::new(&settings, source, mailer, components);
        let locales = site.locales.current().await;
        info!(locales = ?locales.locales, default = %locales.default_locale, "locales ready");
        let app = build_app(site);

        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        });
        info!(%addr, "listening");

        Ok(StartProcess {
            state: ServerStarted { addr, server },
        })
    }
}

impl StartProcess<ServerStarted> {
    #[tracing::instrument(skip_all, fields(addr = %self.state.addr))]
    async fn wait(self) -> Result<()> {
        match self.state.server.await {
            Ok(result) => Ok(result?),
            Err(e) => Err(Error::Server(e.to_string())),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
        futures::future::pending::<()>().await;
    }
    info!("shutting down");
}
