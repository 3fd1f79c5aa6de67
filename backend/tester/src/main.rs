use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "ATTENDANCE_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post one card scan
    Scan {
        card_id: String,

        #[arg(long)]
        time: Option<String>,
    },

    /// Post one scan per card, in order
    Burst { card_ids: Vec<String> },

    Register {
        card_id: String,

        name: String,

        #[arg(long)]
        class: Option<String>,

        #[arg(long)]
        roll: Option<String>,
    },

    All,
    Latest,
    Today,
    Students,
    Clear,
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let base = args.url.trim_end_matches('/');

    let request = |method: Method, path: &str| client.request(method, format!("{base}{path}"));

    match args.command {
        Command::Scan { card_id, time } => {
            let body = json!({ "cardId": card_id, "time": time });
            send(request(Method::POST, "/attendance").json(&body)).await?;
        }
        Command::Burst { card_ids } => {
            for card_id in card_ids {
                let body = json!({ "cardId": card_id });
                send(request(Method::POST, "/attendance").json(&body)).await?;
            }
        }
        Command::Register {
            card_id,
            name,
            class,
            roll,
        } => {
            let body = json!({
                "cardId": card_id,
                "name": name,
                "studentClass": class,
                "rollNumber": roll,
            });
            send(request(Method::POST, "/students/register").json(&body)).await?;
        }
        Command::All => send(request(Method::GET, "/attendance")).await?,
        Command::Latest => send(request(Method::GET, "/attendance/latest")).await?,
        Command::Today => send(request(Method::GET, "/attendance/today")).await?,
        Command::Students => send(request(Method::GET, "/students")).await?,
        Command::Clear => send(request(Method::DELETE, "/attendance/clear")).await?,
        Command::Ping => send(request(Method::GET, "/test")).await?,
    }

    Ok(())
}

async fn send(request: RequestBuilder) -> anyhow::Result<()> {
    let response = request.send().await.context("Server unreachable")?;
    let status = response.status();

    let body: Value = response.json().await.context("Response was not JSON")?;

    println!("{status}");
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
