mod serve;
mod tui;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};

use rabbithole_core::explore::{HttpQueryClient, QueryClient};
use rabbithole_core::query::{strip_item_tags, FollowUpMode, QueryResponse, SearchRequest};
use rabbithole_core::{Config, QueryService};

#[derive(Parser)]
#[command(name = "rabbithole")]
#[command(about = "Explore any topic as a growing graph of search-grounded answers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (defaults to config / PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Open the health endpoint in a browser
        #[arg(long)]
        open: bool,
    },
    /// Answer a single query and print it
    Ask {
        /// What you want to know
        #[arg(required = true)]
        query: Vec<String>,
        /// Ask for focused rather than broad follow-ups
        #[arg(long)]
        focused: bool,
        /// Concept the answer should center on
        #[arg(long)]
        concept: Option<String>,
        /// Send the query to a running server instead of answering locally
        #[arg(long)]
        server: Option<String>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Explore a topic interactively in the terminal
    Explore {
        /// Topic to start with
        query: Vec<String>,
        /// Ask for focused rather than broad follow-ups
        #[arg(long)]
        focused: bool,
        /// Concept every answer should center on
        #[arg(long)]
        concept: Option<String>,
        /// Use a running server instead of answering locally
        #[arg(long)]
        server: Option<String>,
    },
    /// Print configuration
    Config {
        /// Show the effective configuration instead of the defaults
        #[arg(long)]
        effective: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    load_dotenv();

    let cli = Cli::parse();

    // The explorer owns the terminal; its logs only go to LOG_FILE
    let to_terminal = !matches!(cli.command, Commands::Explore { .. });
    init_tracing(to_terminal)?;

    match cli.command {
        Commands::Serve { port, host, open } => {
            let mut config = Config::load()?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let service = QueryService::from_config(&config)
                .wrap_err("failed to initialize the model provider")?;
            tracing::info!(model = service.model_name(), "query service ready");

            serve::start_server(
                serve::ServeConfig {
                    host: config.server.host.clone(),
                    port: config.server.port,
                    open_browser: open,
                },
                service,
            )
            .await?;
        }
        Commands::Ask {
            query,
            focused,
            concept,
            server,
            json,
        } => {
            let client = build_client(server.as_deref()).await?;
            let mut request = SearchRequest::new(query.join(" ")).with_mode(mode(focused));
            request.concept = concept;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.yellow} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Digging into \"{}\"...", request.query));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let result = client.query(&request).await;
            spinner.finish_and_clear();

            let response = result?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
        }
        Commands::Explore {
            query,
            focused,
            concept,
            server,
        } => {
            let client = build_client(server.as_deref()).await?;
            let initial_query = Some(query.join(" ")).filter(|q| !q.trim().is_empty());

            tui::run(
                client,
                tui::ExploreOptions {
                    mode: mode(focused),
                    concept,
                    initial_query,
                },
            )
            .await?;
        }
        Commands::Config { effective } => {
            if effective {
                let config = Config::load()?;
                println!("{}", toml_string(&config));
            } else {
                println!("{}", Config::default_config_string());
            }
        }
    }

    Ok(())
}

fn mode(focused: bool) -> FollowUpMode {
    if focused {
        FollowUpMode::Focused
    } else {
        FollowUpMode::Expansive
    }
}

/// Remote client when a server URL is given, in-process service otherwise.
async fn build_client(server: Option<&str>) -> color_eyre::Result<Arc<dyn QueryClient>> {
    match server {
        Some(url) => {
            let client = HttpQueryClient::new(url);
            client
                .health()
                .await
                .map_err(|e| eyre!("server at {} is not reachable: {}", client.base_url(), e))?;
            Ok(Arc::new(client))
        }
        None => {
            let config = Config::load()?;
            let service = QueryService::from_config(&config)
                .wrap_err("failed to initialize the model provider")?;
            Ok(Arc::new(service))
        }
    }
}

fn toml_string(config: &Config) -> String {
    // Keys are never serialized, only reported
    let mut out = String::new();
    out.push_str(&format!("# provider: {}\n", config.llm.provider));
    out.push_str(&format!(
        "# search key: {}\n",
        if config.search.api_key.is_some() { "set" } else { "missing" }
    ));
    out.push_str(&format!(
        "# model key: {}\n\n",
        if config.llm.api_key_or_env().is_some() { "set" } else { "missing" }
    ));
    out.push_str(&config.to_toml_string());
    out
}

fn print_response(response: &QueryResponse) {
    println!("{}\n", strip_item_tags(&response.response));

    if !response.follow_up_questions.is_empty() {
        println!("Follow-up questions:");
        for (i, question) in response.follow_up_questions.iter().enumerate() {
            println!("  {}. {}", i + 1, question);
        }
        println!();
    }

    if !response.sources.is_empty() {
        println!("Sources:");
        for (i, source) in response.sources.iter().enumerate() {
            println!("  [{}] {} <{}>", i + 1, source.title, source.url);
        }
    }
}

/// Load .env from the current directory, falling back to its parent.
fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

/// Initializes tracing: to stderr when `to_terminal`, and to `LOG_FILE` (append) when set.
fn init_tracing(to_terminal: bool) -> color_eyre::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,rabbithole_core=debug,rabbithole=debug")
        })
    };

    let terminal_layer = to_terminal.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter())
    });

    let file_layer = match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .wrap_err_with(|| format!("cannot open LOG_FILE {}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(filter()),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();
    Ok(())
}
