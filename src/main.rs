//! ACM command-line client
//!
//! Drives the library from a terminal. Results print as pretty JSON.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acm_client::cache::QueryResult;
use acm_client::config::Config;
use acm_client::errors::ClientError;
use acm_client::models::{
    AiQaRequest, FarmListParams, ListParams, OnHandParams, PageParams, SeasonListParams,
    TaskListParams,
};
use acm_client::AcmClient;

#[derive(Parser, Debug)]
#[command(name = "acm")]
#[command(about = "Command-line client for the ACM crop management platform")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    SignIn {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ACM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// Farms
    Farms {
        #[command(subcommand)]
        action: FarmAction,
    },
    /// Plots
    Plots {
        #[command(subcommand)]
        action: PlotAction,
    },
    /// Seasons
    Seasons {
        #[command(subcommand)]
        action: SeasonAction,
    },
    /// Tasks of a season
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Quantity of a supply lot on hand
    OnHand {
        #[arg(long)]
        lot_id: i64,
        #[arg(long)]
        warehouse_id: i64,
        #[arg(long)]
        location_id: Option<i64>,
    },
    /// Ask the AI assistant a question
    Ask {
        question: String,
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FarmAction {
    List {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "20")]
        size: u32,
    },
    Get {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum PlotAction {
    List {
        /// Only plots of this farm (paginated)
        #[arg(long)]
        farm_id: Option<i64>,
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "20")]
        size: u32,
    },
}

#[derive(Subcommand, Debug)]
enum SeasonAction {
    List {
        #[arg(long)]
        plot_id: Option<i64>,
        #[arg(long)]
        crop_id: Option<i64>,
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "20")]
        size: u32,
    },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    List {
        #[arg(long)]
        season_id: i64,
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "20")]
        size: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Backend: {}", config.api_base_url);
    tracing::debug!("Session file: {:?}", config.session_path);

    let client = AcmClient::from_config(&config).await?;
    run(&client, args.command).await?;

    Ok(())
}

async fn run(client: &AcmClient, command: Command) -> Result<(), ClientError> {
    let repo = client.repo();

    match command {
        Command::SignIn { username, password } => {
            let user = client.sign_in(&username, &password).await?;
            print_json(&user)
        }
        Command::SignOut => client.sign_out().await,
        Command::Whoami => match client.current_user().await {
            Some(user) => print_json(&user),
            None => Err(ClientError::Auth("Not signed in".to_string())),
        },
        Command::Farms { action } => match action {
            FarmAction::List {
                keyword,
                active,
                page,
                size,
            } => {
                let params = FarmListParams {
                    keyword,
                    active,
                    paging: PageParams::new(page, size),
                };
                print_result(repo.list_farms(&params).await)
            }
            FarmAction::Get { id } => print_result(repo.get_farm(id).await),
            FarmAction::Delete { id } => repo.delete_farm(id).await,
        },
        Command::Plots { action } => match action {
            PlotAction::List {
                farm_id: Some(farm_id),
                page,
                size,
            } => {
                let params = ListParams {
                    paging: PageParams::new(page, size),
                };
                print_result(repo.list_farm_plots(farm_id, &params).await)
            }
            PlotAction::List { farm_id: None, .. } => print_result(repo.list_plots().await),
        },
        Command::Seasons { action } => match action {
            SeasonAction::List {
                plot_id,
                crop_id,
                page,
                size,
            } => {
                let params = SeasonListParams {
                    plot_id,
                    crop_id,
                    paging: PageParams::new(page, size),
                    ..Default::default()
                };
                print_result(repo.list_seasons(&params).await)
            }
        },
        Command::Tasks { action } => match action {
            TaskAction::List {
                season_id,
                page,
                size,
            } => {
                let params = TaskListParams {
                    paging: PageParams::new(page, size),
                    ..Default::default()
                };
                print_result(repo.list_tasks(season_id, &params).await)
            }
        },
        Command::OnHand {
            lot_id,
            warehouse_id,
            location_id,
        } => {
            let params = OnHandParams {
                warehouse_id,
                location_id,
            };
            print_result(repo.on_hand(lot_id, &params).await)
        }
        Command::Ask { question, context } => {
            let answer = repo.ask(&AiQaRequest { question, context }).await?;
            print_json(&answer)
        }
    }
}

/// Print the data of a read. A failed read with last known data prints it and warns.
fn print_result<T: Serialize>(result: QueryResult<T>) -> Result<(), ClientError> {
    match result {
        QueryResult::Failed {
            error,
            last_known: Some(data),
        } => {
            tracing::warn!("Showing cached data, refresh failed: {}", error);
            print_json(&data)
        }
        other => print_json(&other.into_result()?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
