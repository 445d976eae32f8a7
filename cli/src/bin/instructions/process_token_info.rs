use crate::*;

pub async fn process_token_info(args: &Args, token_args: &TokenArgs) -> Result<()> {
    let mut workflow = args.get_workflow().await?;
    let state = workflow.select_token(token_args.token).await;

    print_token(&workflow);
    if token_args.token.is_native() {
        return Ok(());
    }
    let Some(context) = workflow.token_context() else {
        bail!("Token information not available");
    };
    if let Some(allowance) = context.allowance_to_spender {
        let formatted = context
            .units()
            .format(allowance)
            .unwrap_or_else(|_| allowance.to_string());
        println!(
            "Allowance to {}: {} {}",
            args.distributor_address, formatted, context.symbol
        );
    }
    info!("authorization: {:?}", state);
    Ok(())
}
