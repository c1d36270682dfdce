//! CLI binary for the DigitalNZ client.
//!
//! Usage: dnz search rugby --filter category=Images --facet year

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use dnz_client::{DnzClient, DnzError, Filter, SearchOptions, SortDirection};
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "dnz", about = "DigitalNZ API client", version)]
    struct Cli {
        /// API key (overrides DNZ_API_KEY env var)
        #[arg(long, global = true)]
        api_key: Option<String>,

        /// API version (v1 or v2)
        #[arg(long, global = true)]
        api_version: Option<String>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Search DigitalNZ
        Search {
            /// Free-text query
            text: String,
            /// Results per page
            #[arg(short, long, default_value = "20")]
            num_results: u32,
            /// Page to fetch (1-based)
            #[arg(short, long)]
            page: Option<u64>,
            /// Filter as field=value; repeat a field to OR its values
            #[arg(short, long)]
            filter: Vec<String>,
            /// Facets to return
            #[arg(long)]
            facet: Vec<String>,
            /// Sort field, e.g. "date" or "date:asc"
            #[arg(short, long)]
            sort: Option<String>,
            /// Saved custom search name
            #[arg(long)]
            custom_search: Option<String>,
        },
        /// List categories with result counts
        Categories,
        /// Show a record's metadata
        Record {
            /// Record id
            id: String,
        },
    }

    fn make_client(api_key: Option<String>, version: Option<String>) -> dnz_client::error::Result<DnzClient> {
        let client = match api_key {
            Some(key) => DnzClient::new(key)?,
            None => DnzClient::from_env()?,
        };
        Ok(match version {
            Some(v) => client.with_version(v),
            None => client,
        })
    }

    fn parse_filter(pairs: &[String]) -> dnz_client::error::Result<Filter> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for pair in pairs {
            let (field, value) = pair
                .split_once('=')
                .ok_or_else(|| DnzError::Config(format!("filter must be field=value: {}", pair)))?;
            match grouped.iter_mut().find(|(f, _)| f == field) {
                Some((_, values)) => values.push(value.to_string()),
                None => grouped.push((field.to_string(), vec![value.to_string()])),
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(field, mut values)| {
                if values.len() == 1 {
                    (field, dnz_client::FilterValue::One(values.remove(0)))
                } else {
                    (field, dnz_client::FilterValue::Many(values))
                }
            })
            .collect())
    }

    fn parse_sort(s: &str) -> (String, SortDirection) {
        match s.split_once(':') {
            Some((field, "asc")) => (field.to_string(), SortDirection::Asc),
            Some((field, _)) => (field.to_string(), SortDirection::Desc),
            None => (s.to_string(), SortDirection::Desc),
        }
    }

    fn print_items_table(items: &[dnz_client::Item]) {
        use comfy_table::{ContentArrangement, Table};

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Id", "Category", "Title"]);

        for item in items {
            let title = item.title().unwrap_or("-");
            let title = if title.chars().count() > 60 {
                format!("{}...", title.chars().take(57).collect::<String>())
            } else {
                title.to_string()
            };
            table.add_row(vec![
                item.id().unwrap_or("-").to_string(),
                item.category().unwrap_or("-").to_string(),
                title,
            ]);
        }

        println!("{table}");
    }

    pub async fn run() -> dnz_client::error::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();
        let client = make_client(cli.api_key, cli.api_version)?;

        match cli.command {
            Commands::Search {
                text,
                num_results,
                page,
                filter,
                facet,
                sort,
                custom_search,
            } => {
                let mut options = SearchOptions::new()
                    .num_results(num_results)
                    .filter(parse_filter(&filter)?);
                if let Some(page) = page {
                    options = options.page(page);
                }
                for name in facet {
                    options = options.facet(name);
                }
                if let Some(sort) = sort.as_deref() {
                    let (field, direction) = parse_sort(sort);
                    options = options.sort(field, direction);
                }
                if let Some(name) = custom_search {
                    options = options.custom_search(name);
                }

                let search = client.search(&text, options).await?;
                match cli.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(search.response())?);
                    }
                    OutputFormat::Table => {
                        println!(
                            "{} results for {} (page {} of {}):",
                            search.result_count(),
                            search.text(),
                            search.page(),
                            search.pages()
                        );
                        print_items_table(search.results());
                        for f in search.facets() {
                            println!("\n{}:", f.name);
                            for value in f {
                                println!("  {} ({})", value.name, value.count);
                            }
                        }
                    }
                }
            }

            Commands::Categories => {
                let categories = client.categories(SearchOptions::new()).await?;
                match cli.output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
                    OutputFormat::Table => {
                        for c in &categories {
                            println!("{} ({})", c.name, c.count);
                        }
                    }
                }
            }

            Commands::Record { id } => {
                let record = client.record(&id).await?;
                match cli.output {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(record.metadata())?);
                    }
                    OutputFormat::Table => {
                        use comfy_table::{ContentArrangement, Table};
                        let mut table = Table::new();
                        table.set_content_arrangement(ContentArrangement::Dynamic);
                        table.set_header(vec!["Schema", "Name", "Value", "Namespace", "User"]);
                        for m in record.metadata() {
                            table.add_row(vec![
                                m.schema().to_string(),
                                m.name().to_string(),
                                m.value().to_string(),
                                m.namespace().join("::"),
                                m.user_contributed().to_string(),
                            ]);
                        }
                        println!("{table}");
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
