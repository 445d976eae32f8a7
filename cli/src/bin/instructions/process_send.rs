use hyperdrop_core::executor::DistributionRequest;

use crate::*;

pub async fn process_send(args: &Args, send_args: &SendArgs) -> Result<()> {
    let mut workflow = prepare(args, &send_args.distribution).await?;

    let units = workflow
        .units()
        .ok_or_else(|| anyhow!("Token information not available"))?;
    let request =
        DistributionRequest::new(*workflow.token(), workflow.recipients().as_slice(), &units)?;
    println!(
        "Sending {} {} to {} recipients",
        request.formatted_total(),
        units.symbol,
        request.addresses.len()
    );

    match workflow.holder_balance().await {
        Ok(balance) if balance < request.total_amount => warn!(
            "balance {} {} is below the total to distribute",
            units.format(balance).unwrap_or_else(|_| balance.to_string()),
            units.symbol
        ),
        Ok(_) => {}
        Err(e) => warn!("could not read holder balance: {}", e),
    }

    if send_args.dry_run {
        for recipient in workflow.recipients() {
            println!("{},{}", recipient.address, recipient.amount);
        }
        println!(
            "Dry run, nothing submitted ({})",
            describe_authorization(workflow.authorization())
        );
        return Ok(());
    }

    match workflow.authorization() {
        AuthorizationState::Required if send_args.approve => {
            let state = workflow.approve().await?;
            println!("Authorization: {}", describe_authorization(state));
        }
        AuthorizationState::Required => {
            bail!("Allowance is short of the total; rerun with --approve or run `approve` first")
        }
        AuthorizationState::Granted | AuthorizationState::NotRequired => {}
        other => bail!("cannot send: {}", describe_authorization(other)),
    }

    let outcome = workflow.execute().await?;
    report_outcome(outcome)
}
