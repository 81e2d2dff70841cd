use std::path::PathBuf;

use clap::Parser;

use crate::db::DbSettings;
use crate::source::FetchOptions;
use crate::store::StoreOptions;

/// Employers loaded when `EMPLOYER_IDS` is not set.
pub const DEFAULT_EMPLOYER_IDS: [i64; 10] = [
    561525, 1721871, 10438139, 9740285, 4667763, 985552, 2628254, 8932785, 1178077, 1455,
];

#[derive(Parser, Debug, Clone)]
#[command(name = "vacancy-hh", about = "Load hh.ru vacancies into PostgreSQL and report on them")]
pub struct Config {
    /// Base URL of the vacancy provider API
    #[arg(long, env = "BASE_URL", default_value = "https://api.hh.ru")]
    pub base_url: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Name of the database holding the employers and vacancies tables
    #[arg(long, env = "DB_NAME", default_value = "vacancy_hh")]
    pub db_name: String,

    /// Employer identifiers to load, comma separated
    #[arg(long, env = "EMPLOYER_IDS", value_delimiter = ',')]
    pub employer_ids: Vec<i64>,

    /// Vacancies requested per page
    #[arg(long, env = "PER_PAGE", default_value = "50")]
    pub per_page: u32,

    /// Pages fetched per employer; 1 keeps the single-page behaviour
    #[arg(long, env = "MAX_PAGES", default_value = "1")]
    pub max_pages: u32,

    /// Skip vacancies already stored for the same employer and link
    #[arg(long, env = "DEDUP_VACANCIES", default_value = "false")]
    pub dedup_vacancies: bool,

    /// Directory receiving the per-component log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Console log filter, used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "vacancy_hh=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Load vacancies and print the report (default when no subcommand given)
    Run {
        /// Keyword for the final search; prompted for when omitted
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Fetch vacancies and rebuild the database from them
    Load,
    /// Print the report over an already loaded database
    Report {
        /// Keyword for the final search; prompted for when omitted
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Look up employers by name and list their vacancies
    Resolve {
        /// Employer names to search for
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Config {
    /// Resolve the command, defaulting to Run if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run { keyword: None })
    }

    pub fn resolved_employer_ids(&self) -> Vec<i64> {
        if self.employer_ids.is_empty() {
            DEFAULT_EMPLOYER_IDS.to_vec()
        } else {
            self.employer_ids.clone()
        }
    }

    pub fn db_settings(&self) -> DbSettings {
        DbSettings {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            per_page: self.per_page,
            max_pages: self.max_pages,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            dedup_vacancies: self.dedup_vacancies,
        }
    }
}
