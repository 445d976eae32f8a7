use crate::*;

pub async fn process_approve(args: &Args, approve_args: &DistributionArgs) -> Result<()> {
    let mut workflow = prepare(args, approve_args).await?;

    match workflow.authorization() {
        AuthorizationState::Required => {}
        AuthorizationState::Granted | AuthorizationState::NotRequired => {
            println!("Nothing to approve: {}", describe_authorization(workflow.authorization()));
            return Ok(());
        }
        other => bail!("cannot approve: {}", describe_authorization(other)),
    }

    let state = workflow.approve().await?;
    println!("Authorization: {}", describe_authorization(state));
    Ok(())
}
