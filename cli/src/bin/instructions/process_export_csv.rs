use crate::*;

pub fn process_export_csv(export_args: &ExportCsvArgs) -> Result<()> {
    let recipients = RecipientList::new_from_file(&export_args.csv_path)?;
    recipients.write_to_file(&export_args.out_path)?;
    println!(
        "Wrote {} recipients to {}",
        recipients.len(),
        export_args.out_path.display()
    );
    Ok(())
}
