use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use story_server::story::split_actions;

#[derive(Parser)]
#[command(name = "story-cli")]
#[command(about = "Command-line client for the story server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Begin a story from a premise
    Start { premise: String },
    /// Continue a story with the chosen action
    Continue { story: String, action: String },
    /// Suggest actions for the current story
    Actions { story: String },
    /// List subscription plans
    Subscriptions,
    /// Buy a plan for the user owning the token
    Purchase {
        id: i64,
        #[arg(short, long)]
        token: String,
    },
    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Start { premise } => {
            let res = client
                .post(format!("{}/ai/send-message-start", cli.url))
                .json(&json!({ "message": premise }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Continue { story, action } => {
            let res = client
                .post(format!("{}/ai/send-message", cli.url))
                .json(&json!({ "message": story, "prompt": action }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Actions { story } => {
            let res = client
                .post(format!("{}/ai/get-actions", cli.url))
                .json(&json!({ "message": story }))
                .send()
                .await?;
            if let Some(body) = read_json(res).await? {
                let raw = body["initial"].as_str().unwrap_or_default();
                for (i, action) in split_actions(raw).iter().enumerate() {
                    println!("{}. {}", i + 1, action);
                }
            }
        }
        Commands::Subscriptions => {
            let res = client.get(format!("{}/subscription", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Purchase { id, token } => {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
            let res = client
                .post(format!("{}/subscription/purchase/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(json) = read_json(res).await? {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
