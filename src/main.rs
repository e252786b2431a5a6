//! Resume matcher: scores resumes against job postings

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_matcher::cli::{Cli, Commands, ConfigAction, ModelAction, OutputArgs, ScoringArgs};
use resume_matcher::config::Config;
use resume_matcher::error::{MatcherError, Result};
use resume_matcher::input::RecordLoader;
use resume_matcher::output::formatter::{formatter_for, save_report_to_file};
use resume_matcher::output::report::{Report, ReportContent, ReportMetadata};
use resume_matcher::processing::comparison::compare_strategies;
use resume_matcher::processing::embedding_manager::{find_model, ModelManager, MODEL_CATALOGUE};
use resume_matcher::processing::matcher::Matcher;
use resume_matcher::processing::ranking::{rank_jobs, rank_resumes};
use resume_matcher::processing::similarity::StrategyKind;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Match {
            resume,
            job,
            strategy,
            scoring,
            output,
        } => {
            let mut loader = RecordLoader::new();
            let resume = loader.load_resume(&resume).await?;
            let job = loader.load_job(&job).await?;

            let matcher = build_matcher(&config, strategy, &scoring)?;
            let start_time = Instant::now();
            let scorer = matcher.clone();
            let result = score_blocking("Scoring resume", move || scorer.score(&resume, &job)).await?;

            let report = Report::new(metadata_for(&matcher, matcher.strategy_name(), start_time), ReportContent::Match { result });
            emit(&report, &config, &output)
        }

        Commands::RankJobs {
            resume,
            jobs,
            strategy,
            scoring,
            ranking,
            output,
        } => {
            let mut loader = RecordLoader::new();
            let resume = loader.load_resume(&resume).await?;
            let jobs = loader.load_jobs(&jobs).await?;

            let matcher = build_matcher(&config, strategy, &scoring)?;
            let options = ranking.options(&config);
            let start_time = Instant::now();
            let resume_id = resume.id.to_string();
            let scorer = matcher.clone();
            let outcome = score_blocking(&format!("Ranking {} jobs", jobs.len()), move || {
                rank_jobs(&scorer, &resume, &jobs, options)
            })
            .await?;

            let report = Report::new(
                metadata_for(&matcher, matcher.strategy_name(), start_time),
                ReportContent::JobRanking { resume_id, outcome },
            );
            emit(&report, &config, &output)
        }

        Commands::RankResumes {
            job,
            resumes,
            strategy,
            scoring,
            ranking,
            output,
        } => {
            let mut loader = RecordLoader::new();
            let job = loader.load_job(&job).await?;
            let resumes = loader.load_resumes(&resumes).await?;

            let matcher = build_matcher(&config, strategy, &scoring)?;
            let options = ranking.options(&config);
            let start_time = Instant::now();
            let (job_id, job_title) = (job.id.to_string(), job.job_title.clone());
            let scorer = matcher.clone();
            let outcome = score_blocking(&format!("Ranking {} resumes", resumes.len()), move || {
                rank_resumes(&scorer, &job, &resumes, options)
            })
            .await?;

            let report = Report::new(
                metadata_for(&matcher, matcher.strategy_name(), start_time),
                ReportContent::ResumeRanking {
                    job_id,
                    job_title,
                    outcome,
                },
            );
            emit(&report, &config, &output)
        }

        Commands::Compare {
            resume,
            jobs,
            primary,
            secondary,
            scoring,
            output,
        } => {
            let mut loader = RecordLoader::new();
            let resume = loader.load_resume(&resume).await?;
            let jobs = loader.load_jobs(&jobs).await?;

            let first = build_matcher(&config, Some(primary), &scoring)?;
            let second = build_matcher(&config, Some(secondary), &scoring)?;
            let start_time = Instant::now();
            let (a, b) = (first.clone(), second.clone());
            let rows = score_blocking("Comparing strategies", move || compare_strategies(&resume, &jobs, &a, &b)).await?;

            let label = format!("{} vs {}", primary, secondary);
            let report = Report::new(
                metadata_for(&first, &label, start_time),
                ReportContent::Comparison {
                    primary: primary.to_string(),
                    secondary: secondary.to_string(),
                    rows,
                },
            );
            emit(&report, &config, &output)
        }

        Commands::Models { action } => run_models(action, &config).await,

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("# {}\n", path.display());
                    println!("{}", config.to_toml()?);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset: {}", path.display());
                }
                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
            Ok(())
        }
    }
}

async fn run_models(action: ModelAction, config: &Config) -> Result<()> {
    let mut manager = ModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("Embedding models ({})\n", manager.models_dir().display());
            for model in MODEL_CATALOGUE.iter() {
                let status = if manager.is_downloaded(model.id) { "downloaded" } else { "available" };
                let default_marker = if model.id == config.models.default_embedding_model { " (default)" } else { "" };
                println!("  • {}{} [{}] - {} MB, {} dims", model.id, default_marker, status, model.size_mb, model.dimensions);
                println!("    {}", model.description);
            }
        }
        ModelAction::Download { model, force } => {
            let spinner = spinner(&format!("Downloading {}", model));
            let result = manager.download_model(&model, force).await;
            spinner.finish_and_clear();
            println!("Model ready at {}", result?.display());
        }
        ModelAction::Remove { model } => {
            manager.remove_model(&model).await?;
            println!("Removed model '{}'", model);
        }
        ModelAction::Info { model } => {
            let info = find_model(&model).ok_or_else(|| MatcherError::ModelNotFound(model.clone()))?;
            println!("Id: {}", info.id);
            println!("Name: {}", info.name);
            println!("Repository: {}", info.repo_id);
            println!("Size: {} MB", info.size_mb);
            println!("Dimensions: {}", info.dimensions);
            println!("Description: {}", info.description);
            match manager.model_path(info.id) {
                Some(path) => println!("Location: {}", path.display()),
                None => println!("Status: not downloaded"),
            }
        }
    }
    Ok(())
}

fn build_matcher(config: &Config, strategy: Option<StrategyKind>, scoring: &ScoringArgs) -> Result<Matcher> {
    let kind = strategy.unwrap_or(config.scoring.strategy);
    let scheme = scoring.scheme(config);
    let matcher = Matcher::new(kind.build(config))
        .with_scheme(scheme)
        .with_overrides(scoring.weight_overrides(config)?);

    let weights = matcher.weights();
    if !weights.is_normalized(scheme) {
        warn!(
            "Weights for the {} scheme sum to {:.2}; overall scores are not on a 0-100 scale",
            scheme,
            weights.sum(scheme)
        );
    }
    info!("Using {} strategy with {} scheme", kind, scheme);
    Ok(matcher)
}

fn metadata_for(matcher: &Matcher, strategy: &str, start_time: Instant) -> ReportMetadata {
    ReportMetadata::new(
        strategy,
        matcher.scheme(),
        matcher.weights(),
        start_time.elapsed().as_millis() as u64,
    )
}

/// Scoring may load an embedding model and is CPU bound, so it runs off the
/// async executor.
async fn score_blocking<T, F>(message: &str, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let spinner = spinner(message);
    let joined = tokio::task::spawn_blocking(work).await;
    spinner.finish_and_clear();
    joined.map_err(|e| MatcherError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn emit(report: &Report, config: &Config, args: &OutputArgs) -> Result<()> {
    let mut options = config.output.clone();
    options.detailed |= args.detailed;
    let format = args.output.unwrap_or(options.format);

    let rendered = formatter_for(format, &options).format_report(report)?;
    match &args.save {
        Some(path) => {
            save_report_to_file(&rendered, Path::new(path))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
