//! pgbuild: declarative PostgreSQL schemas from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Print the DDL of a described table
//! pgbuild ddl tables/users.yaml
//!
//! # Migrate a live table to its description
//! pgbuild diff postgres://localhost/app/app.users tables/users.yaml
//!
//! # Build deployable role trees
//! pgbuild build roles.yaml build/ --layout psql
//! ```

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use pgbuild::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pgbuild")]
#[command(version)]
#[command(about = "Declarative PostgreSQL schemas and migrations", long_about = None)]
#[command(after_help = "LOCATIONS:
    A location is a YAML table description path, or
    postgres://user@host/database/schema.table for a live table.")]
struct Cli {
    /// Configuration file (default: ./pgbuild.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the create script of a table
    Ddl {
        location: String,

        #[arg(short, long, value_enum, default_value = "sql")]
        format: OutputFormat,
    },
    /// Print the script migrating <FROM> to <TO>
    Diff {
        from: String,
        to: String,

        /// Diff check constraints too
        #[arg(long)]
        checks: bool,
    },
    /// Drop and recreate a table in a database
    Deploy {
        location: String,

        #[arg(env = "PGBUILD_DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Write install scripts for every role of a role file
    Build {
        roles: PathBuf,
        dest: PathBuf,

        #[arg(short, long, value_enum)]
        layout: Option<Layout>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pgbuild=info" } else { "pgbuild=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ddl { location, format } => {
            let table = load_from_location(&location).await?;
            match format {
                OutputFormat::Sql => print!("{}", table.create_clause()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
        }
        Commands::Diff { from, to, checks } => {
            let from = load_from_location(&from).await?;
            let to = load_from_location(&to).await?;
            let options = AlterOptions {
                checks: checks || config.diff.checks,
            };
            print!("{}", from.alter_to_with(&to, &options));
        }
        Commands::Deploy {
            location,
            database_url,
        } => {
            let Some(url) = database_url.or(config.database_url) else {
                bail!("No database URL. Pass one, set PGBUILD_DATABASE_URL or database_url in pgbuild.toml");
            };
            let table = load_from_location(&location).await?;
            let db = PgBuildDb::connect(&url).await?;
            db.deploy_table(&table).await?;
            println!("{} {} deployed", "OK".green().bold(), table.name);
        }
        Commands::Build {
            roles,
            dest,
            layout,
        } => {
            let layout = layout.unwrap_or(config.build.layout);
            let roles = load_roles(&roles)?;
            build_roles(&roles, &dest, layout)?;
            println!("{} build created at {}", "OK".green().bold(), dest.display());
        }
    }

    Ok(())
}
