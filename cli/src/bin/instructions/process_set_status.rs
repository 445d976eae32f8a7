use crate::*;

pub async fn process_set_status(args: &Args, set_status_args: &SetStatusArgs) -> Result<()> {
    args.api_client()
        .update_status(&set_status_args.tx_hash, set_status_args.status)
        .await?;
    println!(
        "Marked {} as {}",
        set_status_args.tx_hash, set_status_args.status
    );
    Ok(())
}
