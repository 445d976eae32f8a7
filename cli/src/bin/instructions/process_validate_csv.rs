use hyperdrop_core::executor::DistributionRequest;
use hyperdrop_core::units::AmountUnits;

use crate::*;

pub fn process_validate_csv(validate_args: &ValidateCsvArgs) -> Result<()> {
    let recipients = RecipientList::new_from_file(&validate_args.csv_path)?;
    let units = AmountUnits::new("", validate_args.decimals);

    let request = DistributionRequest::new(TokenReference::Native, recipients.as_slice(), &units)?;
    println!(
        "{} recipients, total {}",
        request.addresses.len(),
        request.formatted_total()
    );
    Ok(())
}
