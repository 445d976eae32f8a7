use crate::*;

pub async fn process_history(args: &Args, history_args: &HistoryArgs) -> Result<()> {
    let wallet = match history_args.wallet_address {
        Some(wallet) => wallet,
        None => args.signer()?.address(),
    };

    let records = args.api_client().fetch_history(&wallet.to_string()).await?;
    if records.is_empty() {
        println!("No airdrops found for {wallet}");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {} {}  {} recipients  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.total_amount,
            record.token_symbol,
            record.recipient_count(),
            record.status,
            record.tx_hash
        );
    }
    Ok(())
}
