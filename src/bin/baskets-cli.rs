use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "baskets-cli")]
#[command(about = "Management CLI for Request Baskets", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:55555")]
    url: String,

    /// Basket token (printed by `create`).
    #[arg(short, long, env = "BASKET_TOKEN", default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List basket names
    List {
        #[arg(long)]
        max: Option<u32>,
        #[arg(long)]
        skip: Option<u32>,
    },
    /// Create a basket and print its token
    Create {
        name: String,
        #[arg(long)]
        forward_url: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// Show basket configuration
    Get { name: String },
    /// Delete a basket
    Delete { name: String },
    /// Show captured requests, newest first
    Requests {
        name: String,
        #[arg(long)]
        max: Option<u32>,
        #[arg(long)]
        skip: Option<u32>,
    },
    /// Drop all captured requests
    Clear { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.token.is_empty() {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&cli.token)?);
    }

    let res = match cli.command {
        Commands::List { max, skip } => {
            client
                .get(format!("{}/baskets", cli.url))
                .query(&page_query(max, skip))
                .send()
                .await?
        }
        Commands::Create { name, forward_url, capacity } => {
            let mut body = serde_json::Map::new();
            if let Some(url) = forward_url {
                body.insert("forwardUrl".into(), Value::from(url));
            }
            if let Some(capacity) = capacity {
                body.insert("capacity".into(), Value::from(capacity));
            }
            client
                .post(format!("{}/baskets/{}", cli.url, name))
                .json(&body)
                .send()
                .await?
        }
        Commands::Get { name } => {
            client
                .get(format!("{}/baskets/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Delete { name } => {
            client
                .delete(format!("{}/baskets/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Requests { name, max, skip } => {
            client
                .get(format!("{}/baskets/{}/requests", cli.url, name))
                .headers(headers)
                .query(&page_query(max, skip))
                .send()
                .await?
        }
        Commands::Clear { name } => {
            client
                .delete(format!("{}/baskets/{}/requests", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn page_query(max: Option<u32>, skip: Option<u32>) -> Vec<(&'static str, u32)> {
    let mut query = Vec::new();
    if let Some(max) = max {
        query.push(("max", max));
    }
    if let Some(skip) = skip {
        query.push(("skip", skip));
    }
    query
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        return Ok(());
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
