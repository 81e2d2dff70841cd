use clap::Parser;

use vacancy_hh::config::{Command, Config};
use vacancy_hh::query::VacancyQueryService;
use vacancy_hh::source::HeadHunterClient;
use vacancy_hh::store::PgVacancyStore;
use vacancy_hh::{report, runner, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    let config = Config::parse();

    let telemetry = telemetry::init(&config.log_level, &config.log_dir)?;
    for path in telemetry.files() {
        tracing::debug!("Logging to {}", path.display());
    }

    let result = run(&config).await;
    if let Err(e) = &result {
        tracing::error!("Run failed: {e:#}");
    }
    telemetry.shutdown()?;
    result
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();

    match config.resolved_command() {
        Command::Run { keyword } => {
            load_command(config).await?;
            report_command(config, keyword, &mut stdout).await?;
        }
        Command::Load => load_command(config).await?,
        Command::Report { keyword } => report_command(config, keyword, &mut stdout).await?,
        Command::Resolve { names } => {
            let source = HeadHunterClient::new(&config.base_url)?;
            report::print_resolved(&source, &names, &mut stdout).await?;
        }
    }
    Ok(())
}

async fn load_command(config: &Config) -> anyhow::Result<()> {
    let source = HeadHunterClient::new(&config.base_url)?;
    let store = PgVacancyStore::new(config.db_settings(), config.store_options());
    let employer_ids = config.resolved_employer_ids();

    tracing::info!(
        "Loading {} employers into '{}'",
        employer_ids.len(),
        config.db_name
    );
    runner::load(
        &source,
        &store,
        &employer_ids,
        config.fetch_options(),
        &config.db_name,
    )
    .await?;
    Ok(())
}

async fn report_command(
    config: &Config,
    keyword: Option<String>,
    out: &mut std::io::Stdout,
) -> anyhow::Result<()> {
    let mut service = VacancyQueryService::connect(&config.db_settings(), &config.db_name).await?;
    report::print_report(&mut service, keyword, out).await?;
    service.close().await?;
    Ok(())
}
