use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server::config::Settings;
use server::{create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trudy")]
#[command(about = "Promotional campaign planning service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Overrides PORT and the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default).
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply database migrations and exit.
    Migrate,
    /// List campaigns and their status.
    Status,
    /// Verify the schema and print the resolved configuration.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(settings, port.or(cli.port)).await,
        Some(Commands::Migrate) => migrate(&settings).await,
        Some(Commands::Status) => status(&settings).await,
        Some(Commands::Check) => check(&settings).await,
        None => serve(settings, cli.port).await,
    }
}

async fn serve(mut settings: Settings, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        settings.port = port;
    }

    tracing::info!("Database: {}", settings.database_url);
    let pool = db::create_pool(&settings.database_url)
        .await
        .context("Failed to create database pool")?;
    db::run_migrations(&pool).await?;
    db::verify_schema(&pool).await?;

    let port = settings.port;
    let fake_runs = settings.fake_runs;
    let models = settings.model_config();
    if !fake_runs && settings.openai_api_key.trim().is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; phase runs will fail until it is");
    }

    let state = AppState::new(pool, settings);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    println!();
    println!("Trudy");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!("  Model:       {}", models.default);
    if fake_runs {
        println!("  Fake runs:   on (no provider calls)");
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

async fn migrate(settings: &Settings) -> Result<()> {
    let pool = db::create_pool(&settings.database_url)
        .await
        .context("Failed to create database pool")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    db::verify_schema(&pool).await?;

    println!("Migrations applied to {}", settings.database_url);
    Ok(())
}

async fn status(settings: &Settings) -> Result<()> {
    let pool = db::create_pool(&settings.database_url)
        .await
        .context("Failed to create database pool")?;
    db::verify_schema(&pool)
        .await
        .context("Database is not migrated; run 'trudy migrate'")?;

    let campaigns = db::CampaignRepository::new(pool).find_all().await?;

    println!();
    println!("Database: {}", settings.database_url);
    println!();

    if campaigns.is_empty() {
        println!("No campaigns yet.");
    } else {
        println!("Campaigns ({}):", campaigns.len());
        for campaign in &campaigns {
            let status = campaign.status.as_str();
            let status_icon = match status {
                "DRAFT" => "○",
                "BRIEFED" => "◔",
                "RUNNING" => "◑",
                "REVIEW" => "◕",
                "COMPLETE" => "●",
                "FAILED" => "✕",
                _ => "?",
            };
            println!(
                "  {} [{}] {} ({}, {})",
                status_icon,
                status,
                campaign.title,
                campaign.mode.as_str(),
                campaign.id
            );
        }
    }

    println!();

    Ok(())
}

async fn check(settings: &Settings) -> Result<()> {
    let pool = db::create_pool(&settings.database_url)
        .await
        .context("Failed to create database pool")?;
    let schema = db::verify_schema(&pool).await;

    let models = settings.model_config();
    let resolved = serde_json::json!({
        "database_url": settings.database_url,
        "port": settings.port,
        "base_url": settings.openai_base_url,
        "api_key_set": !settings.openai_api_key.trim().is_empty(),
        "fake_runs": settings.fake_runs,
        "proof_export": settings.proof_export,
        "models": {
            "default": models.default,
            "framing": models.framing(),
            "create": models.create(),
            "evaluation": models.evaluation(),
            "synthesis": models.synthesis(),
            "judge": models.judge(),
            "fallback": settings.models.fallback,
        },
    });
    println!("{}", serde_json::to_string_pretty(&resolved)?);

    match schema {
        Ok(()) => {
            println!("Schema: ok");
            Ok(())
        }
        Err(e) => Err(e).context("Schema check failed"),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trudy=info,server=info,orchestrator=info,llm=info,tower_http=info".into()
            }),
        )
        .init();
}
