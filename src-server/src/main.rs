use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use links_core::{init_logging, AliasRecord, Config, Links, NewAlias};
use links_server::ItemsResponse;

#[derive(Debug, Parser)]
#[command(name = "links", version, about = "Bang-style URL shortcut redirector")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        app_url: Option<String>,
    },
    /// Register an alias
    Add {
        alias: String,
        url: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Aliases, newest first
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Register a device and print its login token
    Device {
        name: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Resolve a query and print the result as JSON
    Resolve {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        query: Vec<String>,
    },
    /// Show or persist the fallback search engine template
    SearchEngine { template: Option<String> },
    /// Most and least used aliases
    Stats {
        /// Negative values list the least used first
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        limit: i64,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::new(Config::data_dir()),
    };
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Command::Serve { bind, app_url } = &cli.command {
        if let Some(bind) = bind {
            config.bind = bind.clone();
        }
        if let Some(app_url) = app_url {
            config.app_url = app_url.clone();
        }
    }

    let links = Links::new(config).context("failed to open links database")?;
    links.initialize()?;

    match cli.command {
        Command::Serve { .. } => links_server::serve(links)?,
        Command::Add {
            alias,
            url,
            name,
            tags,
        } => {
            let record = links.create_alias(NewAlias {
                alias,
                name,
                url,
                tags,
            })?;
            println!("{}", alias_line(&record));
        }
        Command::List { limit } => {
            for record in links.list_aliases(limit)? {
                println!("{}", alias_line(&record));
            }
        }
        Command::Device { name, token } => {
            let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
            let device = links.register_device(&name, &token)?;
            println!("{} {}", device.name, token);
        }
        Command::Resolve { query } => {
            let result = links.resolve(&query.join(" "));
            println!(
                "{}",
                serde_json::to_string_pretty(&ItemsResponse::from(result))?
            );
        }
        Command::SearchEngine { template } => {
            if let Some(template) = template {
                links.set_search_engine(template)?;
            }
            println!("{}", links.search_engine());
        }
        Command::Stats { limit } => {
            for count in links.top_aliases(limit)? {
                println!("{:>6}  {}", count.count, count.alias);
            }
        }
    }

    Ok(())
}

fn alias_line(record: &AliasRecord) -> String {
    format!("{} -> {}", record.alias, record.url_template)
}
