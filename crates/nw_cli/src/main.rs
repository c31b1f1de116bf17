use std::sync::Arc;

use clap::Parser;
use nw_core::{Article, Error, Result};
use nw_feed::{related_to, FeedSort, Period};
use nw_index::{ArticleIndex, ArticleSource, HttpSource, JsonFileSource};
use nw_query::QueryController;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search and page through a news article collection", long_about = None)]
struct Cli {
    /// Path to a JSON fixture (an array of records or {"items": [...]})
    #[arg(long, global = true)]
    file: Option<String>,
    /// REST endpoint returning article records as JSON
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Rank articles against a free-text query
    Search {
        query: String,
        /// Restrict to a category (case-insensitive exact match)
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print feed pages (newest first by default)
    Feed {
        #[arg(long, default_value_t = 6)]
        page_size: usize,
        /// Recency window: "all" or a number of days
        #[arg(long, default_value = "all")]
        period: String,
        /// Sort order: latest, trending or mostviewed
        #[arg(long, default_value = "latest")]
        sort: String,
        /// How many pages to print
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// List the distinct categories in the collection
    Categories,
    /// Show articles related to the given article id
    Related {
        id: String,
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
}

fn source_from(cli: &Cli) -> Result<Box<dyn ArticleSource>> {
    match (&cli.file, &cli.url) {
        (Some(path), None) => Ok(Box::new(JsonFileSource::new(path))),
        (None, Some(url)) => Ok(Box::new(HttpSource::new(url))),
        (Some(_), Some(_)) => Err(Error::Config("pass either --file or --url, not both".into())),
        (None, None) => Err(Error::Config("an article source is required: --file or --url".into())),
    }
}

fn print_article(position: usize, article: &Article, score: Option<u32>) {
    let date = article
        .published_at
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".into());
    let category = article.category.as_deref().unwrap_or("-");
    match score {
        Some(score) => println!("{:>2}. [{:>4}] {}  ({}, {})", position, score, article.title, date, category),
        None => println!("{:>2}. {}  ({}, {})", position, article.title, date, category),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let source = source_from(&cli)?;
    let index = Arc::new(ArticleIndex::new());
    let report = index.reload_from(source.as_ref()).await?;
    info!("Loaded {} articles from {}", report.loaded, source.describe());

    match cli.command {
        Commands::Search { query, category, limit } => {
            let (controller, _outcomes) = QueryController::new(index, limit.max(1))?;
            let results = controller.run_query(&query, category.as_deref()).await;
            if results.is_empty() {
                println!("No results for {:?}", query);
                return Ok(());
            }
            for (i, result) in results.iter().take(limit).enumerate() {
                print_article(i + 1, &result.article, Some(result.score));
            }
        }
        Commands::Feed { page_size, period, sort, pages } => {
            let (controller, _outcomes) = QueryController::new(index, page_size)?;
            controller.set_period(period.parse::<Period>()?).await;
            controller.set_sort(sort.parse::<FeedSort>()?).await;

            let mut position = 1;
            for page in 0..pages.max(1) {
                let (items, is_last) = controller.run_feed_page().await;
                if items.is_empty() {
                    println!("(no more items)");
                    break;
                }
                println!("--- page {} ---", page + 1);
                for article in &items {
                    print_article(position, article, None);
                    position += 1;
                }
                if is_last {
                    break;
                }
            }
        }
        Commands::Categories => {
            for category in index.distinct_categories().await {
                println!("{category}");
            }
        }
        Commands::Related { id, limit } => {
            let Some(article) = index.find_by_id(&id).await else {
                return Err(Error::Config(format!("no article with id {id:?}")));
            };
            let corpus = index.all().await;
            for (i, related) in related_to(&article, &corpus, limit).iter().enumerate() {
                print_article(i + 1, related, None);
            }
        }
    }

    Ok(())
}
