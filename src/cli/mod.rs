pub mod auth;
pub mod config;
pub mod dashboard;
pub mod expenses;
pub mod report;
pub mod status;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::api::HttpApi;
use crate::error::Result;
use crate::filter::{parse_day, ReportFilter};
use crate::session::{Session, SessionStore};
use crate::settings::{load_settings, resolve_api_url, Settings};

#[derive(Parser)]
#[command(name = "tally", version, about = "Track personal expenses against your expense server.")]
pub struct Cli {
    /// Backend base URL for this run (overrides settings and TALLY_API_URL)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account. Prompts for a password.
    Signup {
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Log in and remember the session. Prompts for a password.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show backend, config location and current user.
    Status,
    /// Record a new expense.
    Add {
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// What the money went on
        #[arg(long)]
        item: String,
        /// Amount, zero or greater
        #[arg(long, allow_hyphen_values = true)]
        cost: String,
    },
    /// List every expense.
    List,
    /// Change the item or cost of an expense. Date and owner cannot change.
    Edit {
        /// Expense ID (shown in `tally list`)
        id: String,
        #[arg(long)]
        item: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        cost: Option<String>,
    },
    /// Delete an expense.
    Delete {
        /// Expense ID (shown in `tally list`)
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Totals, recent expenses and monthly/category charts.
    Dashboard,
    /// Filtered report with optional CSV export and AI insights.
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        /// Write the filtered expenses to a CSV file (default: expense-report.csv)
        #[arg(long, num_args = 0..=1, default_missing_value = crate::export::DEFAULT_CSV_NAME)]
        csv: Option<String>,
        /// Ask the server for AI commentary on the report
        #[arg(long)]
        insights: bool,
    },
    /// AI commentary on your spending.
    Insights {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// View or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Clone, Default)]
pub struct FilterArgs {
    /// Start date: YYYY-MM-DD (inclusive)
    #[arg(long = "from", value_parser = parse_day)]
    pub from_date: Option<NaiveDate>,
    /// End date: YYYY-MM-DD (inclusive)
    #[arg(long = "to", value_parser = parse_day)]
    pub to_date: Option<NaiveDate>,
    /// Case-insensitive text to look for in the item
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn into_filter(self) -> ReportFilter {
        ReportFilter::new(self.from_date, self.to_date, self.search)
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings.
    Show,
    /// Set a value.
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ConfigKey {
    ApiUrl,
    Currency,
}

/// Everything a command needs from the environment, resolved once in `main`.
pub struct Context {
    pub settings: Settings,
    pub sessions: SessionStore,
    pub api_url: String,
}

impl Context {
    pub fn load(api_url_flag: Option<&str>) -> Self {
        let settings = load_settings();
        let api_url = resolve_api_url(&settings, api_url_flag);
        Self {
            settings,
            sessions: SessionStore::default_location(),
            api_url,
        }
    }

    pub fn api(&self) -> Result<HttpApi> {
        HttpApi::new(&self.api_url)
    }

    pub fn session(&self) -> Result<Session> {
        self.sessions.require()
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }
}
