mod api;
mod cli;
mod coerce;
mod error;
mod export;
mod filter;
mod fmt;
mod forms;
mod models;
mod reports;
mod session;
mod settings;
mod sync;
mod tui;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands, ConfigCommands, Context};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let ctx = Context::load(cli.api_url.as_deref());

    let result = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Signup { name, email } => cli::auth::signup(&ctx, &name, &email),
        Commands::Login { email } => cli::auth::login(&ctx, &email),
        Commands::Logout => cli::auth::logout(&ctx),
        Commands::Status => cli::status::run(&ctx),
        Commands::Add { date, item, cost } => cli::expenses::add(&ctx, &date, &item, &cost),
        Commands::List => cli::expenses::list(&ctx),
        Commands::Edit { id, item, cost } => {
            cli::expenses::edit(&ctx, &id, item.as_deref(), cost.as_deref())
        }
        Commands::Delete { id, yes } => cli::expenses::delete(&ctx, &id, yes),
        Commands::Dashboard => cli::dashboard::run(&ctx),
        Commands::Report {
            filter,
            csv,
            insights,
        } => cli::report::run(&ctx, filter.into_filter(), csv.as_deref(), insights),
        Commands::Insights { filter } => cli::report::insights(&ctx, filter.into_filter()),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(&ctx),
            ConfigCommands::Set { key, value } => cli::config::set(&ctx, key, &value),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tally", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
