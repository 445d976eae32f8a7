use hyperdrop_core::recipient::Recipient;

use crate::*;

pub fn process_create_dummy_csv(args: &CreateDummyCsvArgs) -> Result<()> {
    let mut recipients = RecipientList::default();
    for _ in 0..args.num_records {
        let address = Address::from(rand::random::<[u8; 20]>());
        recipients.push(Recipient::new(address.to_checksum(None), args.amount.clone()));
    }
    recipients.write_to_file(&args.csv_path)?;
    println!(
        "Wrote {} dummy recipients to {}",
        recipients.len(),
        args.csv_path.display()
    );
    Ok(())
}
