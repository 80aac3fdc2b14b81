use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::TryStreamExt;
use likeminded::client::LikeMindedClient;
use likeminded::config::{
    default_config_path, find_config_file, get_config, load_config, Config, LOCAL_CONFIG_FILE,
};
use likeminded::models::{ProjectStatus, Reference, SearchRequest, SearchType, SortOrder};
use likeminded::utils::display::{mask_secret, references_plain, references_table};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Likeminded - Search civic projects and resources
#[derive(Parser, Debug)]
#[command(name = "likeminded")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search projects and resources on Likeminded", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key (overrides configuration and LIKEMINDED_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL of the search service
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Entity type filter
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TypeArg {
    Project,
    Resource,
    All,
}

impl From<TypeArg> for SearchType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Project => SearchType::Project,
            TypeArg::Resource => SearchType::Resource,
            TypeArg::All => SearchType::All,
        }
    }
}

/// Project status filter
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StatusArg {
    /// Projects that are starting up
    Starting,
    /// Ongoing projects
    Ongoing,
    /// Completed projects
    Completed,
    All,
}

impl From<StatusArg> for ProjectStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Starting => ProjectStatus::StartingUp,
            StatusArg::Ongoing => ProjectStatus::Ongoing,
            StatusArg::Completed => ProjectStatus::Completed,
            StatusArg::All => ProjectStatus::All,
        }
    }
}

/// Sort order
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    Relevance,
    Recent,
    All,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortOrder::Relevance,
            SortArg::Recent => SortOrder::Recent,
            SortArg::All => SortOrder::All,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search projects and resources
    #[command(alias = "s")]
    Search {
        /// Search terms (empty matches everything)
        #[arg(default_value = "")]
        query: String,

        /// Category ids (repeat or comma-separate)
        #[arg(long, short, value_delimiter = ',')]
        category: Vec<String>,

        /// Subcategory ids (repeat or comma-separate)
        #[arg(long, value_delimiter = ',')]
        subcategory: Vec<String>,

        /// Only projects or only resources
        #[arg(long = "type", short = 't', value_enum)]
        search_type: Option<TypeArg>,

        /// Project status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Sort order
        #[arg(long, short, value_enum)]
        sort: Option<SortArg>,

        /// Page to fetch (1-based)
        #[arg(long, short, default_value_t = 1)]
        page: u32,

        /// Fetch every page, one request at a time
        #[arg(long, conflicts_with = "page")]
        all: bool,

        /// Stop after this many pages when using --all
        #[arg(long, requires = "all")]
        max_pages: Option<usize>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("likeminded={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_effective_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let mut config = match &path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config(),
    };

    if let Some(api_key) = &cli.api_key {
        config.api.api_key = Some(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    Ok((config, path))
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn output_references(references: &[Reference], format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(references)?),
        OutputFormat::Plain => println!("{}", references_plain(references)),
        OutputFormat::Table => println!("{}", references_table(references)),
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}

fn build_request(
    query: String,
    category: Vec<String>,
    subcategory: Vec<String>,
    search_type: Option<TypeArg>,
    status: Option<StatusArg>,
    sort: Option<SortArg>,
) -> SearchRequest {
    let mut request = SearchRequest::new(query);
    if !category.is_empty() {
        request = request.category(category);
    }
    if !subcategory.is_empty() {
        request = request.subcategory(subcategory);
    }
    request.search_type = search_type.map(Into::into);
    request.status = status.map(Into::into);
    request.sort = sort.map(Into::into);
    request
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load_effective_config(&cli)?;
    init_logging(&cli, &config);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::Search {
            query,
            category,
            subcategory,
            search_type,
            status,
            sort,
            page,
            all,
            max_pages,
        } => {
            let client = LikeMindedClient::from_config(&config)?;
            let request = build_request(query, category, subcategory, search_type, status, sort);

            if all {
                let references: Vec<Reference> =
                    client.stream(&request, max_pages).try_collect().await?;
                if !cli.quiet {
                    eprintln!("Fetched {} references", references.len());
                }
                output_references(&references, cli.output)?;
            } else {
                let results = client.search_page(&request, page).await?;
                if resolve_format(cli.output) == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    if !cli.quiet {
                        eprintln!(
                            "Page {}: {} of {} references",
                            results.page(),
                            results.len(),
                            results.available()
                        );
                    }
                    output_references(results.references(), cli.output)?;
                }
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => {
                let path = match path.or_else(default_config_path) {
                    Some(path) => path,
                    None => PathBuf::from(LOCAL_CONFIG_FILE),
                };
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }

                let mut template = Config::default();
                template.api.api_key = None;
                template.save(&path)?;
                println!("Wrote {}", path.display());
            }
            ConfigCommands::Show => {
                let mut shown = config.clone();
                shown.api.api_key = shown.api.api_key.as_deref().map(mask_secret);
                print!("{}", toml::to_string_pretty(&shown)?);
            }
        },
    }

    Ok(())
}
