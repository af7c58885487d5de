use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loan_payments::gateway::LoanGateway;
use loan_payments::{
    ClientConfig, HttpGateway, InterestCalculator, LoanApp, LogNotices, SubmitOutcome,
};

#[derive(Parser)]
#[command(name = "loan-payments")]
#[command(about = "List loans and record loan payments", long_about = None)]
#[command(version)]
struct Cli {
    /// GraphQL endpoint of the loan service [env: LOAN_PAYMENTS_ENDPOINT]
    /// [default: http://localhost:2024/graphql]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds [env: LOAN_PAYMENTS_TIMEOUT_SECS] [default: 10]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every loan with its payment status
    List,

    /// Show raw payment records
    Payments,

    /// Record a payment, then show the refreshed loan list
    Pay {
        /// Loan id
        loan_id: String,

        /// Payment amount
        amount: String,

        /// Payment date (YYYY-MM-DD); the service default applies when omitted
        #[arg(long)]
        date: Option<String>,
    },

    /// Simple interest: principal * rate * months / 100
    Interest {
        principal: f64,
        /// Percent per month
        rate: f64,
        months: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "loan_payments=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = client_config(&cli)?;
    let connect = || -> Result<Arc<HttpGateway>> {
        Ok(Arc::new(
            HttpGateway::new(&config).context("building HTTP client")?,
        ))
    };

    match cli.command {
        Commands::List => {
            let app = LoanApp::new(connect()?, Arc::new(LogNotices::new()));
            print_loans(&app, cli.json).await?;
        }
        Commands::Payments => {
            let payments = connect()?
                .fetch_loan_payments()
                .await
                .context("fetching loan payments")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&payments)?);
            } else {
                println!("ID  Loan ID  Payment Date");
                for p in payments {
                    println!(
                        "{:<3} {:<8} {}",
                        p.id,
                        p.loan_id,
                        p.payment_date.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Pay {
            loan_id,
            amount,
            date,
        } => {
            let mut app = LoanApp::new(connect()?, Arc::new(LogNotices::new()));
            app.list().settled().await;
            match app.submit_payment(&loan_id, &amount, date.as_deref()).await {
                SubmitOutcome::Updated { .. } => print_loans(&app, cli.json).await?,
                SubmitOutcome::Rejected { message } => anyhow::bail!("payment rejected: {message}"),
                SubmitOutcome::TransportFailed(err) => {
                    return Err(err).context("submitting payment");
                }
                SubmitOutcome::InvalidInput(err) => return Err(err.into()),
            }
        }
        Commands::Interest {
            principal,
            rate,
            months,
        } => {
            let interest = InterestCalculator::new().interest(principal, rate, months);
            if cli.json {
                println!("{}", serde_json::json!({ "interest": interest }));
            } else {
                println!("Loan Interest: {}", interest);
            }
        }
    }
    Ok(())
}

/// Environment settings, then command-line flags on top.
fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let config = ClientConfig::from_env().context("reading loan service settings")?;
    Ok(apply_flags(config, cli))
}

fn apply_flags(mut config: ClientConfig, cli: &Cli) -> ClientConfig {
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config
}

async fn print_loans<G: LoanGateway>(app: &LoanApp<G>, json: bool) -> Result<()> {
    app.list().settled().await;
    let snapshot = app.list().snapshot();
    if let Some(err) = snapshot.last_error {
        return Err(err).context("fetching loans");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&app.list().rows())?);
    } else {
        print!("{}", app.list().render_table());
    }
    Ok(())
}
