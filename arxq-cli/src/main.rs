use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arxq::{CompilerConfig, QueryCompiler};

#[derive(Parser, Debug)]
#[command(name = "arxq")]
#[command(about = "arxq CLI - compile chat search queries into arXiv API queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a search DSL string and print the result
    Compile {
        /// Query string, e.g. '(bert | gpt) @google 20 rd'
        query: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Include the token vector and AST in the output
        #[arg(long)]
        debug: bool,

        /// Path to a TOML config file (created with defaults if missing)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            query,
            json,
            debug,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => CompilerConfig::load_or_create(&path)?,
                None => CompilerConfig::default(),
            };
            cfg.debug = cfg.debug || debug;

            let compiler = QueryCompiler::from_config(&cfg);
            tracing::debug!(input = %query, "compiling query");
            match compiler.parse(&query) {
                Ok(parsed) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&parsed)?);
                    } else {
                        let c = &parsed.compiled;
                        println!("query:   {}", c.query);
                        println!("results: {}", c.max_results);
                        println!("sort:    {} {}", c.sort_by, c.sort_order);
                        println!("echo:    {}", c.echo);
                        if let Some(tokens) = &parsed.tokens {
                            println!("tokens:  {tokens:#?}");
                        }
                        if let Some(ast) = &parsed.ast {
                            println!("ast:     {ast:#?}");
                        }
                    }
                }
                Err(err) => {
                    if json {
                        let body = serde_json::json!({
                            "error": err.message,
                            "stage": err.stage.to_string(),
                            "position": err.position,
                        });
                        println!("{}", serde_json::to_string_pretty(&body)?);
                    } else {
                        match err.position {
                            Some(col) => eprintln!("error ({} stage, column {col}): {err}", err.stage),
                            None => eprintln!("error ({} stage): {err}", err.stage),
                        }
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
