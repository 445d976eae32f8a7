mod evm;
mod instructions;

use std::{path::PathBuf, time::Duration};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use hyperdrop_api::{
    types::{LeaderboardQuery, RecordStatus, SortDirection, SortField, TimeFilter},
    AirdropApiClient, PersistHandler,
};
use hyperdrop_core::{
    events::LogNotifier,
    gate::AuthorizationState,
    recipient::RecipientList,
    session::Session,
    token::{NativeAsset, TokenReference},
    units::format_amount,
    workflow::{ExecutionOutcome, Workflow, WorkflowConfig},
};
use tracing::{info, warn};

use crate::{evm::EvmClient, instructions::*};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// JSON-RPC endpoint
    #[clap(long, env, default_value = "https://sepolia.drpc.org")]
    pub rpc_url: String,

    /// Persistence backend base url
    #[clap(long, env, default_value = "http://localhost:3001")]
    pub api_url: String,

    /// Chain the distributor is deployed on
    #[clap(long, env, default_value_t = 11155111)]
    pub chain_id: u64,

    /// Airdrop distributor contract
    #[clap(
        long,
        env,
        default_value = "0x1e3a0AD09978f9c7bfCEA6b5eeE5bDC7DE8B324d"
    )]
    pub distributor_address: Address,

    #[clap(long, env, default_value = "ETH")]
    pub native_symbol: String,

    #[clap(long, env, default_value_t = 18)]
    pub native_decimals: u8,

    /// Hex private key of the sending wallet
    #[clap(long, env, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Delay between receipt polls, in milliseconds
    #[clap(long, env, default_value_t = 2000)]
    pub receipt_poll_ms: u64,

    /// Give up waiting for a receipt after this many seconds
    #[clap(long, env)]
    pub confirmation_timeout_secs: Option<u64>,
}

impl Args {
    fn signer(&self) -> Result<PrivateKeySigner> {
        let key = self
            .private_key
            .as_deref()
            .ok_or_else(|| anyhow!("a wallet is required: set PRIVATE_KEY or pass --private-key"))?;
        key.trim()
            .parse()
            .map_err(|e| anyhow!("invalid private key: {e}"))
    }

    fn chain_client(&self, signer: Option<PrivateKeySigner>) -> Result<EvmClient> {
        EvmClient::connect(
            &self.rpc_url,
            signer,
            self.distributor_address,
            Duration::from_millis(self.receipt_poll_ms),
        )
    }

    fn api_client(&self) -> AirdropApiClient {
        AirdropApiClient::new(&self.api_url)
    }

    fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            spender: self.distributor_address,
            native: NativeAsset {
                symbol: self.native_symbol.clone(),
                decimals: self.native_decimals,
            },
            confirmation_timeout: self.confirmation_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Session-bound workflow for the configured wallet, with persistence
    /// and log notification subscribed.
    async fn get_workflow(&self) -> Result<Workflow<EvmClient>> {
        let signer = self.signer()?;
        let session = Session::new(signer.address(), self.chain_id);
        let client = self.chain_client(Some(signer))?;

        match client.chain_id().await {
            Ok(id) if id != self.chain_id => {
                bail!("rpc is on chain {id}, expected {}", self.chain_id)
            }
            Ok(_) => {}
            Err(e) => warn!("could not verify chain id: {e}"),
        }

        let mut workflow = Workflow::new(client, session, self.workflow_config());
        workflow.subscribe(LogNotifier);
        workflow.subscribe(PersistHandler::new(self.api_client()));
        Ok(workflow)
    }
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show symbol, decimals, balance and allowance of a token
    TokenInfo(TokenArgs),
    /// Check whether the distributor may spend enough for a recipient list
    Allowance(DistributionArgs),
    /// Approve the distributor for a recipient list's total
    Approve(DistributionArgs),
    /// Send a batch transfer to every recipient in a CSV
    Send(SendArgs),
    /// Validate a recipient CSV without touching the chain
    ValidateCsv(ValidateCsvArgs),
    /// Normalize a recipient CSV and write it back out
    ExportCsv(ExportCsvArgs),
    CreateDummyCsv(CreateDummyCsvArgs),
    /// List past distributions of a wallet
    History(HistoryArgs),
    Leaderboard(LeaderboardArgs),
    /// Overwrite the status of a stored distribution
    SetStatus(SetStatusArgs),
}

#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Token contract, or `native`
    #[clap(long, env, default_value_t = TokenReference::Native)]
    pub token: TokenReference,
}

#[derive(Parser, Debug)]
pub struct DistributionArgs {
    #[clap(long, env, default_value_t = TokenReference::Native)]
    pub token: TokenReference,

    /// Recipient CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    #[clap(flatten)]
    pub distribution: DistributionArgs,

    /// Submit the approval first when the allowance is short
    #[clap(long)]
    pub approve: bool,

    /// Validate and print the batch, but do not submit it
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateCsvArgs {
    #[clap(long, env)]
    pub csv_path: PathBuf,

    /// Decimals to check amount precision against
    #[clap(long, env, default_value_t = 18)]
    pub decimals: u8,
}

#[derive(Parser, Debug)]
pub struct ExportCsvArgs {
    #[clap(long, env)]
    pub csv_path: PathBuf,

    #[clap(long, env)]
    pub out_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CreateDummyCsvArgs {
    /// CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,
    #[clap(long, env)]
    pub num_records: u64,
    #[clap(long, env)]
    pub amount: String,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Defaults to the configured wallet
    #[clap(long, env)]
    pub wallet_address: Option<Address>,
}

#[derive(Parser, Debug)]
pub struct LeaderboardArgs {
    #[clap(long, default_value_t = 1)]
    pub page: u32,
    #[clap(long, default_value_t = 10)]
    pub limit: u32,
    #[clap(long, default_value = "totalAmountSent")]
    pub sort_field: SortField,
    #[clap(long, default_value = "desc")]
    pub sort_direction: SortDirection,
    #[clap(long, default_value = "all-time")]
    pub time_filter: TimeFilter,
}

#[derive(Parser, Debug)]
pub struct SetStatusArgs {
    #[clap(long)]
    pub tx_hash: String,
    /// pending, completed or failed
    #[clap(long)]
    pub status: RecordStatus,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    match &args.command {
        Commands::TokenInfo(token_args) => process_token_info(&args, token_args).await,
        Commands::Allowance(allowance_args) => process_allowance(&args, allowance_args).await,
        Commands::Approve(approve_args) => process_approve(&args, approve_args).await,
        Commands::Send(send_args) => process_send(&args, send_args).await,
        Commands::ValidateCsv(validate_args) => process_validate_csv(validate_args),
        Commands::ExportCsv(export_args) => process_export_csv(export_args),
        Commands::CreateDummyCsv(dummy_args) => process_create_dummy_csv(dummy_args),
        Commands::History(history_args) => process_history(&args, history_args).await,
        Commands::Leaderboard(leaderboard_args) => {
            process_leaderboard(&args, leaderboard_args).await
        }
        Commands::SetStatus(set_status_args) => process_set_status(&args, set_status_args).await,
    }
}

/// Load a recipient list and a token into a fresh workflow.
async fn prepare(args: &Args, distribution: &DistributionArgs) -> Result<Workflow<EvmClient>> {
    let recipients = RecipientList::new_from_file(&distribution.csv_path)?;
    println!("Successfully imported {} recipients", recipients.len());

    let mut workflow = args.get_workflow().await?;
    workflow.edit_recipients(|list| list.replace_all(recipients));
    let state = workflow.select_token(distribution.token).await;
    info!("authorization for {}: {:?}", distribution.token, state);
    print_token(&workflow);
    Ok(workflow)
}

fn print_token(workflow: &Workflow<EvmClient>) {
    match workflow.token_context() {
        Some(context) => {
            let balance = context
                .formatted_balance()
                .unwrap_or_else(|_| context.holder_balance.to_string());
            println!(
                "Token {} ({}), {} decimals, balance {}",
                context.symbol, context.reference, context.decimals, balance
            );
        }
        None if workflow.token().is_native() => {
            if let Some(units) = workflow.units() {
                println!("Native {} ({} decimals)", units.symbol, units.decimals);
            }
        }
        None => println!("Token information not available"),
    }
}

fn format_total(workflow: &Workflow<EvmClient>) -> Option<String> {
    let units = workflow.units()?;
    let total = workflow.total_amount()?;
    let formatted = format_amount(total, units.decimals).ok()?;
    Some(format!("{formatted} {}", units.symbol))
}

fn describe_authorization(state: AuthorizationState) -> &'static str {
    match state {
        AuthorizationState::NotRequired => "no approval needed for the native asset",
        AuthorizationState::Unchecked => "allowance unknown",
        AuthorizationState::Required => "approval required",
        AuthorizationState::InFlight => "approval in progress",
        AuthorizationState::Granted => "approved",
        AuthorizationState::Failed => "approval confirmed but allowance could not be re-read",
    }
}

fn report_outcome(outcome: ExecutionOutcome) -> Result<()> {
    match outcome {
        ExecutionOutcome::Succeeded {
            tx_hash,
            handler_failures,
        } => {
            println!("Airdrop executed successfully: {tx_hash}");
            for failure in handler_failures {
                warn!("{}", failure);
            }
            Ok(())
        }
        ExecutionOutcome::Pending { tx_hash } => {
            println!("Transaction {tx_hash} submitted, still awaiting confirmation");
            Ok(())
        }
        ExecutionOutcome::Cancelled { reason } => bail!("Airdrop execution canceled: {reason}"),
        ExecutionOutcome::Failed(failure) => bail!("Airdrop execution failed: {failure}"),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_send_defaults_to_native() {
        let args = Args::try_parse_from(["hyperdrop", "send", "--csv-path", "list.csv"]).unwrap();
        let Commands::Send(send_args) = args.command else {
            panic!("expected send");
        };
        assert!(send_args.distribution.token.is_native());
        assert!(!send_args.approve);
        assert_eq!(args.chain_id, 11155111);
        assert_eq!(args.confirmation_timeout_secs, None);
    }

    #[test]
    fn test_leaderboard_query_args() {
        let args = Args::try_parse_from([
            "hyperdrop",
            "leaderboard",
            "--sort-field",
            "walletsReached",
            "--time-filter",
            "7-days",
        ])
        .unwrap();
        let Commands::Leaderboard(leaderboard_args) = args.command else {
            panic!("expected leaderboard");
        };
        assert_eq!(leaderboard_args.sort_field, SortField::WalletsReached);
        assert_eq!(leaderboard_args.time_filter, TimeFilter::SevenDays);
        assert_eq!(leaderboard_args.sort_direction, SortDirection::Desc);
    }
}
