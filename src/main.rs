use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use persona_sim::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use persona_sim::adapters::cache::{FileResultCache, InMemoryResultCache};
use persona_sim::adapters::storage::InMemoryExperimentRepository;
use persona_sim::application::{
    BatchControl, CreateExperimentCommand, CreateExperimentHandler, EnrichmentSettings,
    ExportExperimentHandler, ExportExperimentQuery, ForkExperimentCommand, ForkExperimentHandler,
    PersonaEnricher, PersonaGenerator, RunSimulationCommand, RunSimulationHandler, ShareAction,
    ShareExperimentCommand, ShareExperimentHandler, SimulationExecutor,
};
use persona_sim::config::{AiProvider, AppConfig};
use persona_sim::domain::company::{BusinessModel, CompanyInput, CompanySize};
use persona_sim::domain::feature::FeatureDescription;
use persona_sim::domain::foundation::ExperimentId;
use persona_sim::domain::insights::Aggregator;
use persona_sim::ports::{AIProvider, ResultCache};
use secrecy::ExposeSecret;

#[derive(Parser)]
#[command(name = "persona-sim")]
#[command(about = "Predict feature adoption with a synthetic persona panel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a panel, simulate a feature, and print the export as JSON
    Run {
        /// Company description as JSON; a sample company when omitted
        #[arg(long)]
        company: Option<PathBuf>,
        /// Feature description as JSON; a sample feature when omitted
        #[arg(long)]
        feature: Option<PathBuf>,
        /// Panel size; the configured default when omitted
        #[arg(long)]
        personas: Option<usize>,
        /// Second feature to test on the same panel
        #[arg(long)]
        fork_feature: Option<PathBuf>,
        /// Issue a share token for each experiment
        #[arg(long)]
        share: bool,
    },
    /// Print the effective configuration checks and exit
    CheckConfig,
}

struct App {
    create: CreateExperimentHandler,
    run: RunSimulationHandler,
    fork: ForkExperimentHandler,
    share: ShareExperimentHandler,
    export: ExportExperimentHandler,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::CheckConfig => {
            info!(provider = ?config.ai.provider, model = %config.ai.model, "Configuration is valid");
            Ok(())
        }
        Commands::Run {
            company,
            feature,
            personas,
            fork_feature,
            share,
        } => {
            let app = build_app(&config)?;
            let company = match company {
                Some(path) => read_json(&path)?,
                None => sample_company(),
            };
            let feature = match feature {
                Some(path) => read_json(&path)?,
                None => sample_feature(),
            };

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, finishing in-flight calls");
                    let _ = cancel_tx.send(true);
                }
            });

            let created = app
                .create
                .handle(CreateExperimentCommand {
                    company,
                    persona_count: personas,
                    feature,
                })
                .await?;
            let experiment_id = created.experiment.id();
            simulate_and_print(&app, experiment_id, &cancel_rx, share).await?;

            if let Some(path) = fork_feature {
                let forked = app
                    .fork
                    .handle(ForkExperimentCommand {
                        experiment_id,
                        feature: read_json(&path)?,
                    })
                    .await?;
                simulate_and_print(&app, forked.experiment.id(), &cancel_rx, share).await?;
            }
            Ok(())
        }
    }
}

async fn simulate_and_print(
    app: &App,
    experiment_id: ExperimentId,
    cancel: &watch::Receiver<bool>,
    share: bool,
) -> Result<()> {
    let result = app
        .run
        .handle(
            RunSimulationCommand::new(experiment_id)
                .with_control(BatchControl::new().with_cancellation(cancel.clone())),
        )
        .await?;
    if !result.failures.is_empty() {
        warn!(
            experiment_id = %experiment_id,
            failures = result.failures.len(),
            "Some personas could not be simulated"
        );
    }

    if share {
        let shared = app
            .share
            .handle(ShareExperimentCommand {
                experiment_id,
                action: ShareAction::Share,
            })
            .await?;
        info!(experiment_id = %experiment_id, share_token = ?shared.share_token, "Experiment shared");
    }

    let export = app
        .export
        .handle(ExportExperimentQuery { experiment_id })
        .await?;
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}

fn build_app(config: &AppConfig) -> Result<App> {
    let provider: Arc<dyn AIProvider> = match config.ai.provider {
        AiProvider::Mock => Arc::new(MockAIProvider::offline()),
        AiProvider::OpenAI => {
            let api_key = config
                .ai
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is required for the openai provider")?;
            let openai = OpenAIConfig::new(api_key.expose_secret().clone())
                .with_model(config.ai.model.clone())
                .with_base_url(config.ai.base_url.clone())
                .with_timeout(config.ai.timeout());
            Arc::new(OpenAIProvider::new(openai)?)
        }
    };
    let cache: Arc<dyn ResultCache> = match &config.simulation.cache_dir {
        Some(dir) => Arc::new(FileResultCache::new(dir)),
        None => Arc::new(InMemoryResultCache::new()),
    };
    let repository = Arc::new(InMemoryExperimentRepository::new());

    let enricher = Arc::new(PersonaEnricher::new(
        provider.clone(),
        EnrichmentSettings {
            temperature: config.ai.temperature,
            max_tokens: config.ai.enrichment_max_tokens,
        },
    ));
    let generator = Arc::new(PersonaGenerator::new(
        enricher,
        config.personas.enrichment_concurrency,
    ));
    let executor = Arc::new(SimulationExecutor::new(
        provider,
        cache,
        config
            .simulation
            .executor_settings(config.ai.temperature, config.ai.max_tokens),
    ));

    Ok(App {
        create: CreateExperimentHandler::new(
            generator,
            repository.clone(),
            config.personas.limits(),
        ),
        run: RunSimulationHandler::new(
            executor,
            repository.clone(),
            Aggregator::new(config.insights.aggregation_settings()),
        ),
        fork: ForkExperimentHandler::new(repository.clone()),
        share: ShareExperimentHandler::new(repository.clone()),
        export: ExportExperimentHandler::new(repository),
    })
}

fn init_tracing(config: &AppConfig) {
    let filter = config.telemetry.env_filter();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.telemetry.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn sample_company() -> CompanyInput {
    CompanyInput::new(
        "Flowline",
        "Software",
        BusinessModel::B2B,
        "B2B SaaS ops teams",
        CompanySize::Startup,
    )
    .with_description("Workflow tooling for operations teams at growing software companies")
}

fn sample_feature() -> FeatureDescription {
    FeatureDescription::new(
        "AI workflow automation",
        "Automates repetitive operations work across the tools a team already uses",
        "Hours saved every week without changing tools",
        "Operations managers",
    )
    .with_pricing_model("$20 per seat per month")
}
