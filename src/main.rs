//! ApplyLess: explainable job fit scoring from the command line

use applyless::cli::{Cli, Commands, ConfigAction, MatchArgs, ModelAction, OutputArgs};
use applyless::config::Config;
use applyless::error::{ApplyLessError, Result};
use applyless::input::InputManager;
use applyless::models::{Job, Profile};
use applyless::output::{save_report_to_file, suggest_filename, Report, ReportGenerator, ReportMetadata};
use applyless::processing::embedding_manager::EmbeddingModelManager;
use applyless::processing::{MatchEngine, Model2VecProvider, ProviderHandle, ProviderSlot, SemanticMatcher};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let mut provider_slot = ProviderSlot::new();
    let outcome = run_command(cli.command, config, &config_path, &provider_slot).await;
    provider_slot.teardown();

    if let Err(e) = outcome {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path, slot: &ProviderSlot) -> Result<()> {
    match command {
        Commands::Feed { inputs, output, page, page_size, decision } => {
            let (engine, profile, jobs) = prepare(&config, &inputs, slot).await?;
            let page_size = page_size.unwrap_or(config.output.page_size);

            let spinner = spinner(&format!("Scoring {} jobs...", jobs.len()));
            let feed = engine.feed(&profile, &jobs, page, page_size, decision);
            spinner.finish_and_clear();

            let report = Report::feed(metadata(&engine, &profile), feed?);
            emit(&config, &output, &report)?;
        }

        Commands::Job { job_id, inputs, output } => {
            let (engine, profile, jobs) = prepare(&config, &inputs, slot).await?;
            let job_match = engine.job_detail(&profile, &jobs, &job_id)?;
            let report = Report::detail(metadata(&engine, &profile), job_match);
            emit(&config, &output, &report)?;
        }

        Commands::Stats { inputs, output } => {
            let (engine, profile, jobs) = prepare(&config, &inputs, slot).await?;

            let spinner = spinner(&format!("Scoring {} jobs...", jobs.len()));
            let stats = engine.stats(&profile, &jobs);
            spinner.finish_and_clear();

            let report = Report::stats(metadata(&engine, &profile), stats?);
            emit(&config, &output, &report)?;
        }

        Commands::Status { jobs } => {
            let manager = EmbeddingModelManager::new(&config).await?;
            let model = &config.models.default_embedding_model;

            println!("🩺 ApplyLess v{}", env!("CARGO_PKG_VERSION"));
            println!("🧠 Embedding model: {}", model);
            println!(
                "   Status: {}",
                if manager.is_model_downloaded(model) { "✅ Downloaded" } else { "⬇️  Not downloaded (fetched from the Hub on first use)" }
            );
            println!("⚙️  Config: {}", config_path.display());

            if let Some(path) = jobs {
                let loaded = InputManager::new().load_jobs(&path).await?;
                println!("💼 Jobs loaded: {} from {}", loaded.len(), path.display());
            }
        }

        Commands::Models { action } => run_models(action, &config).await?,

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let policy = &config.policy;
                println!("⚙️  Current Configuration\n");
                println!("Models Directory: {}", config.models_dir().display());
                println!("Default Embedding Model: {}", config.models.default_embedding_model);
                println!("Embedding Cache: {}", if config.matching.enable_caching { "enabled" } else { "disabled" });
                println!("\nScoring Weights:");
                println!("  Semantic: {:.1}%", policy.scoring.semantic_weight * 100.0);
                println!("  Skills: {:.1}%", policy.scoring.skills_weight * 100.0);
                println!("  Experience: {:.1}%", policy.scoring.experience_weight * 100.0);
                println!("  Location: {:.1}%", policy.scoring.location_weight * 100.0);
                println!("\nDecision Bands:");
                println!("  Apply: >= {} (at most {} missing skill)", policy.decision.apply_min, policy.decision.max_missing_for_apply);
                println!("  Wait:  >= {}", policy.decision.wait_min);
                println!("  Skip:  >= {}", policy.decision.skip_min);
                println!("  Avoid: below {} or any critical risk", policy.decision.skip_min);
                println!("\nGhost-job threshold: quality below {:.2}", policy.ghost.ghost_threshold);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

async fn run_models(action: ModelAction, config: &Config) -> Result<()> {
    match action {
        ModelAction::List => {
            let manager = EmbeddingModelManager::new(config).await?;
            println!("📚 Available Embedding Models\n");

            for model in manager.list_available_models() {
                let status = if manager.is_model_downloaded(&model.name) { "✅ Downloaded" } else { "⬇️  Available" };
                let default = if model.name == config.models.default_embedding_model { " (default)" } else { "" };
                println!("  • {}{} ({}) - {} MB, {} dims [{}]", model.name, default, model.repo_id, model.size_mb, model.dimensions, status);
                println!("    {}", model.description);
            }

            if manager.list_downloaded_models().is_empty() {
                println!("\n💡 No models downloaded yet. Get started with:");
                println!("   applyless models download {}", config.models.default_embedding_model);
            }
        }

        ModelAction::Download { model, force } => {
            println!("⬇️  Downloading model: {}", model);
            let mut manager = EmbeddingModelManager::new(config).await?;

            let spinner = spinner(&format!("Fetching {} from the Hugging Face Hub...", model));
            let result = manager.download_model(&model, force).await;
            spinner.finish_and_clear();

            match result {
                Ok(path) => {
                    println!("✅ Model '{}' ready", model);
                    println!("📁 Location: {}", path.display());
                }
                Err(e) => {
                    println!("❌ Failed to download model '{}': {}", model, e);
                    return Err(e);
                }
            }
        }

        ModelAction::Remove { model } => {
            let mut manager = EmbeddingModelManager::new(config).await?;
            let path = manager.remove_model(&model).await?;
            println!("✅ Model '{}' removed", model);
            println!("📁 Removed directory: {}", path.display());
        }

        ModelAction::Info { model } => {
            let manager = EmbeddingModelManager::new(config).await?;
            let info = manager
                .get_model_info(&model)
                .ok_or_else(|| ApplyLessError::ModelNotFound(model.clone()))?;

            println!("📋 Model Information for '{}'\n", model);
            println!("Name: {}", info.name);
            println!("Repository: {}", info.repo_id);
            println!("Size: {} MB", info.size_mb);
            println!("Dimensions: {}", info.dimensions);
            println!("Description: {}", info.description);

            match manager.get_model_path(&info.name) {
                Some(path) => println!("Status: ✅ Downloaded\nLocation: {}", path.display()),
                None => {
                    println!("Status: ⬇️  Available for download");
                    println!("\n💡 To download this model, run:");
                    println!("   applyless models download {}", info.name);
                }
            }
        }
    }

    Ok(())
}

/// Load inputs and bring up the embedding provider.
///
/// A provider that fails to load is fatal: no job is scored without it.
async fn prepare(config: &Config, inputs: &MatchArgs, slot: &ProviderSlot) -> Result<(MatchEngine, Profile, Vec<Job>)> {
    let mut input_manager = InputManager::new();
    let mut profile = input_manager.load_profile(&inputs.profile).await?;
    if let Some(resume) = &inputs.resume {
        input_manager.attach_resume(&mut profile, resume).await?;
    }
    let jobs = input_manager.load_jobs(&inputs.jobs).await?;

    let mut model_config = config.clone();
    if let Some(model) = &inputs.embedding {
        model_config.models.default_embedding_model = model.clone();
    }

    let spinner = spinner(&format!("Loading embedding model {}...", model_config.models.default_embedding_model));
    let provider = slot.get_or_init(|| {
        Model2VecProvider::from_config(&model_config).map(|p| Arc::new(p) as ProviderHandle)
    });
    spinner.finish_and_clear();
    let provider = provider?;
    info!("Embedding provider ready: {}", provider.model_name());

    let matcher = SemanticMatcher::new(provider, &config.matching);
    let mut engine = MatchEngine::new(matcher, config.policy.clone())?;
    if let Some(date) = inputs.as_of {
        engine = engine.with_reference_date(date);
    }

    Ok((engine, profile, jobs))
}

fn metadata(engine: &MatchEngine, profile: &Profile) -> ReportMetadata {
    ReportMetadata::new(&profile.user_id, engine.matcher().model_name(), engine.reference_date())
}

fn emit(config: &Config, args: &OutputArgs, report: &Report) -> Result<()> {
    let format = args.output.unwrap_or(config.output.format);
    let detailed = args.detailed || config.output.detailed;
    let generator = ReportGenerator::with_options(config.output.color_output, detailed);

    let content = generator.generate_report(report, format)?;
    println!("{}", content);

    if let Some(path) = &args.save {
        // Saved files never carry terminal color codes
        let plain = ReportGenerator::with_options(false, detailed).generate_report(report, format)?;
        let target = if path.is_dir() { path.join(suggest_filename(format, report, true)) } else { path.clone() };
        save_report_to_file(&plain, &target)?;
        println!("💾 Saved to {}", target.display());
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
