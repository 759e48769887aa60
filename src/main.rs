use adventure_agent::aggregator::EventAggregator;
use adventure_agent::config::Config;
use adventure_agent::domain::SearchCriteria;
use adventure_agent::logging::init_logging;
use adventure_agent::weather::WeatherService;
use adventure_agent::AdventureAgent;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing::info;

#[derive(Parser)]
#[command(name = "adventure-agent")]
#[command(about = "Weather-aware activity recommendations from aggregated event sources")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with the activity planner agent
    Chat,
    /// One-shot aggregated event search, printed as JSON
    Events {
        /// City to search in
        #[arg(long)]
        city: String,
        /// Two-letter ISO country code
        #[arg(long)]
        country_code: String,
        /// Optional keywords for filtering and ranking
        #[arg(long)]
        keywords: Option<String>,
        /// Optional ISO-8601 start date filter
        #[arg(long)]
        start_date: Option<String>,
        /// Maximum number of results (1-100)
        #[arg(long, default_value_t = 20)]
        max_results: usize,
    },
    /// One-shot weather forecast, printed as JSON
    Weather {
        /// City to fetch the forecast for
        #[arg(long)]
        city: String,
        /// Forecast days (1-7), current day included
        #[arg(long, default_value_t = 1)]
        days: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    init_logging();

    let config = Config::load()?;

    match cli.command {
        Commands::Chat => run_chat(&config).await?,
        Commands::Events {
            city,
            country_code,
            keywords,
            start_date,
            max_results,
        } => {
            let criteria = SearchCriteria {
                city,
                country_code,
                keywords,
                start_date,
                max_results,
            };
            let aggregator = EventAggregator::from_env(&config)?;
            println!("{}", aggregator.search_json(&criteria).await?);
        }
        Commands::Weather { city, days } => {
            let weather = WeatherService::from_env(&config.http)?;
            let forecast = weather.fetch_weather(&city, days).await?;
            println!("{}", serde_json::to_string_pretty(&forecast)?);
        }
    }

    Ok(())
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let mut agent = AdventureAgent::from_env(config)?;
    info!("agent initialized, starting chat loop");

    println!("Adventure Agent ready. Tell me a city and I'll plan your day (type 'quit' to exit).");

    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        match agent.chat(message).await {
            Ok(reply) => println!("\n{}\n", reply),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}
