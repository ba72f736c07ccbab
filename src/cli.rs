use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use pf_client::{
    Filter, HttpTimeouts, LiveTokenSource, MsTokens, PlayFabClient, PlayFabConfig,
    StaticTokenSource, TokenSource, XboxLiveExchange,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Query the Minecraft PlayFab catalog")]
pub struct CliOpts {
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and run one catalog search.
    Search(SearchCommand),
}

#[derive(Debug, Args)]
struct Credentials {
    /// Microsoft access token for the Xbox Live scope
    #[arg(long, env = "MS_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Microsoft refresh token, used when no access token is given
    #[arg(long, env = "MS_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,
}

#[derive(Debug, Args)]
struct SearchCommand {
    #[command(flatten)]
    credentials: Credentials,

    /// Store to search in
    #[arg(long)]
    scid: String,

    /// OData filter expression
    #[arg(long, default_value = "")]
    filter: String,

    /// OData order-by expression
    #[arg(long, default_value = "")]
    order_by: String,

    #[arg(long, default_value_t = 300)]
    limit: u32,

    #[arg(long, default_value_t = 0)]
    skip: u32,

    /// Ask for the total match count
    #[arg(long)]
    count: bool,

    /// Where to write the result
    #[arg(short, long, default_value = "catalog.json")]
    output: PathBuf,
}

impl CliOpts {
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Search(cmd) => cmd.run().await,
        }
    }
}

impl Credentials {
    fn token_source(&self, timeouts: &HttpTimeouts) -> anyhow::Result<Box<dyn TokenSource>> {
        if let Some(token) = &self.access_token {
            return Ok(Box::new(StaticTokenSource::new(token.clone())));
        }
        if let Some(refresh) = &self.refresh_token {
            let tokens = MsTokens::from_refresh_token(refresh.clone());
            return Ok(Box::new(LiveTokenSource::new(tokens, timeouts)?));
        }
        bail!("either --access-token or --refresh-token is required")
    }
}

impl SearchCommand {
    async fn run(&self) -> anyhow::Result<()> {
        let config = PlayFabConfig::minecraft();
        let source = self.credentials.token_source(&config.http_timeouts)?;
        let exchange = XboxLiveExchange::new(&config.http_timeouts)?;

        let client = PlayFabClient::connect(config, source.as_ref(), &exchange)
            .await
            .context("PlayFab login failed")?;
        info!(player_id = client.player_id(), "Logged in");

        let data = client
            .search(&Filter {
                count: self.count,
                filter: self.filter.clone(),
                order_by: self.order_by.clone(),
                scid: self.scid.clone(),
                skip: self.skip,
                limit: self.limit,
            })
            .await
            .context("catalog search failed")?;

        let json = serde_json::to_vec_pretty(&data)?;
        tokio::fs::write(&self.output, json)
            .await
            .with_context(|| format!("Failed to write {}", self.output.display()))?;
        info!(path = %self.output.display(), "Wrote search result");
        Ok(())
    }
}
