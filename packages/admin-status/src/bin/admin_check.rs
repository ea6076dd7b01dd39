//! Check whether a Supabase user holds the admin role.
//!
//! Reads SUPABASE_URL / SUPABASE_ANON_KEY from the environment (or .env).

use admin_status::{run_check, Config, Subject};
use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "admin-check")]
#[command(about = "Resolve whether a user has the admin role in the profiles table")]
#[command(group(ArgGroup::new("who").required(true).args(["user_id", "access_token"])))]
struct Cli {
    /// Profile id (Supabase user UUID) to check
    #[arg(long)]
    user_id: Option<String>,

    /// Session access token; the user is looked up through Supabase Auth
    #[arg(long)]
    access_token: Option<String>,

    /// Override ADMIN_LOOKUP_TIMEOUT_SECS
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,admin_status=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(secs) = cli.timeout_secs {
        config
            .set_lookup_timeout_secs(secs)
            .context("Invalid --timeout-secs")?;
    }

    let subject = match (cli.user_id, cli.access_token) {
        (Some(user_id), _) => Subject::UserId(user_id),
        (None, Some(token)) => Subject::AccessToken(token),
        (None, None) => bail!("either --user-id or --access-token is required"),
    };

    let report = run_check(&config, &subject).await?;
    println!("{}", report.render(cli.json)?);

    Ok(())
}
