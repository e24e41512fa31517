//! Job market analyzer: skill extraction, job matching and CV gap analysis

use clap::Parser;
use job_market_analyzer::analysis::{CvAnalyzer, DashboardService};
use job_market_analyzer::cli::{self, Cli, Commands, ConfigAction};
use job_market_analyzer::config::{Config, OutputFormat};
use job_market_analyzer::error::{AnalyzerError, Result};
use job_market_analyzer::extraction::SkillProcessor;
use job_market_analyzer::input::InputManager;
use job_market_analyzer::output::{Report, ReportGenerator};
use job_market_analyzer::profile::ProfileDetector;
use job_market_analyzer::service::HttpClassificationService;
use job_market_analyzer::storage::{find_matching_jobs, Database, JobRepository, MatchQuery};
use job_market_analyzer::vocabulary::VocabularyStore;
use log::{error, info};
use std::path::PathBuf;
use std::process;

const CV_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

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

    let format = match cli.output.as_deref().map(cli::parse_output_format).transpose() {
        Ok(format) => format.unwrap_or(config.output.format),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path, format).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf, format: OutputFormat) -> Result<()> {
    let console = format == OutputFormat::Console;
    let reports = ReportGenerator::new(&config.output);

    match command {
        Commands::Import { file } => {
            if console {
                println!("📥 Importing job postings from {}", file.display());
            }
            let records = InputManager::new().read_job_records(&file).await?;

            let database = Database::new(&config.database.path).await?;
            let stored = JobRepository::new(database.pool().clone())
                .replace_jobs(&records)
                .await?;

            let report = Report::Import {
                records_read: records.len(),
                jobs_stored: stored,
            };
            println!("{}", reports.generate_report(&report, format)?);
        }

        Commands::Scan => {
            if console {
                println!("🔍 Extracting skills from stored jobs...");
            }
            let vocabulary = VocabularyStore::load(&config.vocabulary)?;
            let database = Database::new(&config.database.path).await?;

            let processor = SkillProcessor::new(
                JobRepository::new(database.pool().clone()),
                &vocabulary,
                &config.scanning,
            );
            let summary = processor.run().await?;
            println!("{}", reports.generate_report(&Report::Scan(&summary), format)?);
        }

        Commands::Match {
            skills,
            level,
            threshold,
            limit,
        } => {
            let vocabulary = VocabularyStore::load(&config.vocabulary)?;
            let targets = vocabulary.current().profiles().target_levels(&level);
            info!("Matching {} skills against levels {:?}", skills.len(), targets);

            let query = MatchQuery::new(skills, targets, level)
                .threshold(threshold.unwrap_or(config.matching.threshold))
                .limit(limit.unwrap_or(config.matching.limit))
                .cross_level_penalty(config.matching.cross_level_penalty);

            let database = Database::new(&config.database.path).await?;
            let matches = find_matching_jobs(database.pool(), &query).await?;
            println!("{}", reports.generate_report(&Report::Matches(&matches), format)?);
        }

        Commands::Detect { cv } => {
            cli::validate_file_extension(&cv, CV_EXTENSIONS).map_err(AnalyzerError::UnsupportedFormat)?;
            if console {
                println!("📄 Reading CV: {}", cv.display());
            }
            let text = InputManager::new().read_cv(&cv).await?;

            let vocabulary = VocabularyStore::load(&config.vocabulary)?.current();
            let detector = ProfileDetector::new(vocabulary.canonical_profiles(), vocabulary.dictionary())?;
            let profile = detector.detect(&text);
            let scores = detector.scores(&text);

            let report = Report::Detection {
                profile: profile.label(),
                scores: &scores,
            };
            println!("{}", reports.generate_report(&report, format)?);
        }

        Commands::Analyze { cv } => {
            cli::validate_file_extension(&cv, CV_EXTENSIONS).map_err(AnalyzerError::UnsupportedFormat)?;
            if console {
                println!("📄 Reading CV: {}", cv.display());
            }
            let text = InputManager::new().read_cv(&cv).await?;

            let service = HttpClassificationService::new(&config.service, config.service_api_key())?;
            let vocabulary = VocabularyStore::load(&config.vocabulary)?;
            let database = Database::new(&config.database.path).await?;

            if console {
                println!("🤖 Analyzing CV against the job market...");
            }
            let analyzer = CvAnalyzer::new(service, vocabulary, database.pool().clone(), config.matching.clone());
            let report = analyzer.analyze(&text).await?;
            println!("{}", reports.generate_report(&Report::Analysis(&report), format)?);
        }

        Commands::Dashboard { top } => {
            let database = Database::new(&config.database.path).await?;
            let stats = DashboardService::new(database.pool().clone()).dashboard(top).await?;
            println!("{}", reports.generate_report(&Report::Dashboard(&stats), format)?);
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("Database: {}", config.database.path.display());
                println!("Skill keywords: {}", config.vocabulary.skill_keywords_path.display());
                println!("Profile config: {}", config.vocabulary.profile_config_path.display());
                println!("\nScanning:");
                println!("  Max workers: {}", config.scanning.max_workers);
                println!("  Progress interval: {}", config.scanning.progress_interval);
                println!("\nMatching:");
                println!("  Threshold: {:.0}%", config.matching.threshold * 100.0);
                println!("  Limit: {}", config.matching.limit);
                println!("  Cross-level penalty: {:.2}", config.matching.cross_level_penalty);
                println!("  Fallback levels: {}", config.matching.fallback_levels.join(", "));
                println!("\nService: {}", config.service.endpoint);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&config_path)?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}
