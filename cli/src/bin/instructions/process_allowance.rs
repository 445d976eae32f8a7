use crate::*;

pub async fn process_allowance(args: &Args, allowance_args: &DistributionArgs) -> Result<()> {
    let workflow = prepare(args, allowance_args).await?;

    if let Some(total) = format_total(&workflow) {
        println!("Total to distribute: {total}");
    }
    let state = workflow.authorization();
    println!("Authorization: {}", describe_authorization(state));
    Ok(())
}
