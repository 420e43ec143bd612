use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "rcfg")]
#[command(about = "Inspect and refresh a running remote-configd", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin bearer token; falls back to $REMOTE_CONFIG_ADMIN_KEY.
    #[arg(short, long, env = "REMOTE_CONFIG_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Engine and cache status
    Status,
    /// Every resolvable key with its value
    List,
    /// One value and whether it came from remote or defaults
    Get { key: String },
    /// Run fetch-and-activate now
    Refresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let base = cli.url.trim_end_matches('/');
    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)),
        Commands::List => client.get(format!("{}/admin/config", base)),
        Commands::Get { key } => {
            let mut url = reqwest::Url::parse(&format!("{}/admin/config/", base))?;
            url.path_segments_mut()
                .map_err(|_| "admin URL cannot be a base")?
                .pop_if_empty()
                .push(key);
            client.get(url)
        }
        Commands::Refresh => client.post(format!("{}/admin/refresh", base)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
