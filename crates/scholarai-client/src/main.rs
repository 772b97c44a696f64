//! ScholarAI terminal client - Entry Point
//!
//! One-shot subcommands for scripting plus an interactive `browse` mode and
//! the development proxy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholarai_client::{
    Config, FilterForm, ScholarClient, SearchOrchestrator, SearchState,
    browse::Browser,
    config::{Environment, api},
    models::{Capabilities, CitationFormat, PaperType, SearchResult, SortMode},
    presentation::{ResultsView, render_capabilities, render_results, render_trending},
    proxy,
    query::MinCitations,
};

#[derive(Parser, Debug)]
#[command(name = "scholarai")]
#[command(about = "Terminal client for the ScholarAI research search backend")]
#[command(version)]
struct Cli {
    /// Backend origin
    #[arg(long, global = true, env = "SCHOLARAI_API_URL")]
    api_url: Option<String>,

    /// Force development mode (route through the dev proxy when one is set)
    #[arg(long, global = true)]
    dev: bool,

    /// Dev proxy origin, e.g. http://127.0.0.1:5173
    #[arg(long, global = true, env = "SCHOLARAI_PROXY_URL")]
    proxy_url: Option<String>,

    /// Results per page (1-50)
    #[arg(long, global = true, env = "SCHOLARAI_PAGE_SIZE")]
    page_size: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for papers
    Search {
        /// Research topic or keywords
        topic: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Page to fetch
        #[arg(long, default_value = "1")]
        page: u32,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Generate an AI summary for a title and abstract
    Summarize {
        /// Paper title
        #[arg(long)]
        title: String,
        /// Paper abstract
        #[arg(long = "abstract")]
        abstract_text: String,
    },
    /// Format citations for search results
    Cite {
        /// Research topic or keywords
        topic: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// 1-based result on the first page; omit to cite the whole page
        #[arg(long)]
        result: Option<usize>,
        /// Citation style (bibtex or apa)
        #[arg(long, default_value = "bibtex")]
        format: CitationFormat,
    },
    /// Download results as a spreadsheet
    Export {
        /// Research topic or keywords
        topic: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Check whether Scopus indexes a DOI
    Scopus {
        /// DOI (bare or https://doi.org/ form)
        doi: String,
    },
    /// Show backend health and capabilities
    Health,
    /// Publication counts per year for a field
    Trending {
        /// Field of study
        field: String,
    },
    /// Interactive browser
    Browse {
        /// Topic to search on start
        topic: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Directory exports are written to
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },
    /// Run the development proxy
    Proxy {
        /// Port to listen on
        #[arg(long, default_value = "5173", env = "PORT")]
        port: u16,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Start year
    #[arg(long)]
    from: Option<i32>,
    /// End year
    #[arg(long)]
    to: Option<i32>,
    /// Minimum citations (any, 5, 10, 25, 50, 100, 500, 1000)
    #[arg(long, default_value = "any")]
    min_citations: MinCitations,
    /// Only open access papers
    #[arg(long)]
    open_access: bool,
    /// Ordering (relevance, citations, year_desc, year_asc)
    #[arg(long, default_value = "relevance")]
    sort: SortMode,
    /// Work type (all, article, review, book-chapter, ...)
    #[arg(long = "type", default_value = "all")]
    type_filter: String,
    /// Author name substring
    #[arg(long, default_value = "")]
    author: String,
}

impl FilterArgs {
    fn form(&self, topic: impl Into<String>) -> anyhow::Result<FilterForm> {
        Ok(FilterForm {
            topic: topic.into(),
            start_year: self.from,
            end_year: self.to,
            min_citations: self.min_citations,
            open_access_only: self.open_access,
            sort_by: self.sort,
            type_filter: PaperType::parse_filter(&self.type_filter)?,
            author: self.author.clone(),
        })
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(proxy_url) = &cli.proxy_url {
        config = config.with_proxy(proxy_url.clone());
    }
    if cli.dev {
        config = config.with_environment(Environment::Development);
        if config.proxy_url.is_none() {
            config = config.with_proxy(api::DEFAULT_PROXY_URL);
        }
    }
    if let Some(size) = cli.page_size {
        config = config.with_page_size(size);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = build_config(&cli)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.base_url(),
        "Starting ScholarAI client"
    );

    let client = Arc::new(ScholarClient::new(config.clone())?);

    match cli.command {
        Command::Search { topic, filters, page, json } => {
            let result = run_search(&client, filters.form(topic)?, page).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let caps = client.capabilities().await;
                let mut views = ResultsView::from_result(&result);
                views.check_scopus_all(&client, &caps).await;
                println!("{}", render_results(&result, &views, result.page_info(client.page_size()), &caps));
            }
        }
        Command::Summarize { title, abstract_text } => {
            let response = client.summarize(&title, &abstract_text).await.map_err(user_error)?;
            match response.provider {
                Some(provider) => println!("{}\n\n(via {provider})", response.summary),
                None => println!("{}", response.summary),
            }
        }
        Command::Cite { topic, filters, result: position, format } => {
            let result = run_search(&client, filters.form(topic)?, 1).await?;
            let citations = match position {
                Some(n) => {
                    let paper = n
                        .checked_sub(1)
                        .and_then(|i| result.results.get(i))
                        .with_context(|| format!("No result {n} on the first page"))?;
                    client.cite(paper, format).await
                }
                None => client.cite_batch(&result.results, format).await,
            };
            println!("{}", citations.map_err(user_error)?);
        }
        Command::Export { topic, filters, out } => {
            let query = filters.form(topic)?.build()?;
            let file = client.export(&query).await.map_err(|e| {
                tracing::warn!(error = %e, "Export failed");
                anyhow::anyhow!(scholarai_client::error::EXPORT_FAILURE_MESSAGE)
            })?;
            let path = out.join(&file.filename);
            tokio::fs::write(&path, &file.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} ({} bytes)", path.display(), file.bytes.len());
        }
        Command::Scopus { doi } => {
            let status = client.scopus_check(&doi).await;
            match (status.indexed, status.scopus_url) {
                (true, Some(url)) => println!("Indexed in Scopus: {url}"),
                (true, None) => println!("Indexed in Scopus"),
                (false, _) => println!("Not indexed in Scopus"),
            }
        }
        Command::Health => {
            let health = client.health().await.map_err(user_error)?;
            println!("Status: {}", health.status);
            if let Some(version) = &health.version {
                println!("Version: {version}");
            }
            if let Some(source) = &health.data_source {
                println!("Data source: {source}");
            }
            println!("{}", render_capabilities(&Capabilities::from(&health)));
        }
        Command::Trending { field } => {
            let trending = client.trending(&field).await.map_err(user_error)?;
            print!("{}", render_trending(&trending));
        }
        Command::Browse { topic, filters, export_dir } => {
            let caps = client.capabilities().await;
            let form = filters.form(topic.unwrap_or_default())?;
            Browser::new(client, caps).with_form(form).with_export_dir(export_dir).run().await?;
        }
        Command::Proxy { port } => proxy::serve(&config, port).await?,
    }

    Ok(())
}

/// Submit one search through the orchestrator and return the result page.
async fn run_search(
    client: &Arc<ScholarClient>,
    form: FilterForm,
    page: u32,
) -> anyhow::Result<SearchResult> {
    let mut orchestrator = SearchOrchestrator::new(Arc::clone(client));
    orchestrator.search(&form).await?;

    if page > 1 {
        if let SearchState::Success(_) = orchestrator.state() {
            orchestrator.go_to_page(page).await?;
        }
    }

    match orchestrator.state() {
        SearchState::Success(result) => Ok(result.clone()),
        SearchState::Failed(message) => Err(anyhow::anyhow!(message.clone())),
        SearchState::Idle | SearchState::Searching => Err(anyhow::anyhow!("Search did not complete")),
    }
}

fn user_error(e: scholarai_client::ClientError) -> anyhow::Error {
    tracing::debug!(error = %e, "Request failed");
    anyhow::anyhow!(e.to_user_message())
}
