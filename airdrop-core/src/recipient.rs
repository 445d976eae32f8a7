use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
    slice,
};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecipientFileError, ValidationError};

pub type Result<T> = std::result::Result<T, RecipientFileError>;

const ADDRESS_COLUMN: &str = "address";
const AMOUNT_COLUMN: &str = "amount";

/// One row of a distribution: who receives and how much (ui amount).
#[derive(Debug, Clone, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// Ordered batch input, edited in place during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    recipients: Vec<Recipient>,
}

impl RecipientList {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self { recipients }
    }

    /// Load recipients from a csv file with `address` and `amount` columns.
    pub fn new_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Header names are matched case-insensitively. Rows missing either value
    /// are dropped, not defaulted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(RecipientFileError::MissingColumn(name))
        };
        let address_col = column(ADDRESS_COLUMN)?;
        let amount_col = column(AMOUNT_COLUMN)?;

        let mut recipients = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let address = record.get(address_col).unwrap_or_default();
            let amount = record.get(amount_col).unwrap_or_default();
            if address.is_empty() || amount.is_empty() {
                debug!("dropping incomplete row {}", row + 1);
                continue;
            }
            recipients.push(Recipient::new(address, amount));
        }

        Ok(Self { recipients })
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([ADDRESS_COLUMN, AMOUNT_COLUMN])?;
        for recipient in self.recipients.iter() {
            wtr.write_record([recipient.address.as_str(), recipient.amount.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Append a blank row for manual entry, returning its index.
    pub fn push_empty(&mut self) -> usize {
        self.recipients.push(Recipient::default());
        self.recipients.len() - 1
    }

    pub fn push(&mut self, recipient: Recipient) {
        self.recipients.push(recipient);
    }

    pub fn update_address(&mut self, index: usize, address: impl Into<String>) -> bool {
        match self.recipients.get_mut(index) {
            Some(recipient) => {
                recipient.address = address.into();
                true
            }
            None => false,
        }
    }

    pub fn update_amount(&mut self, index: usize, amount: impl Into<String>) -> bool {
        match self.recipients.get_mut(index) {
            Some(recipient) => {
                recipient.amount = amount.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Recipient> {
        (index < self.recipients.len()).then(|| self.recipients.remove(index))
    }

    /// An import replaces the whole list.
    pub fn replace_all(&mut self, other: RecipientList) {
        self.recipients = other.recipients;
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Recipient> {
        self.recipients.iter()
    }

    pub fn as_slice(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Checked sum of all amounts scaled to `decimals`. Fails on the first
    /// amount that does not parse, or when the sum exceeds 256 bits.
    pub fn total_amount(&self, decimals: u8) -> std::result::Result<U256, ValidationError> {
        self.recipients
            .iter()
            .enumerate()
            .try_fold(U256::ZERO, |acc, (index, r)| {
                let amount = crate::units::parse_amount(&r.amount, decimals).map_err(|reason| {
                    ValidationError::InvalidAmount {
                        index,
                        amount: r.amount.clone(),
                        reason,
                    }
                })?;
                acc.checked_add(amount)
                    .ok_or(ValidationError::TotalOverflow)
            })
    }
}

impl From<Vec<Recipient>> for RecipientList {
    fn from(recipients: Vec<Recipient>) -> Self {
        Self::new(recipients)
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a Recipient;
    type IntoIter = slice::Iter<'a, Recipient>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipients.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const AAA: &str = "0xAAA0000000000000000000000000000000000001";
    const BBB: &str = "0xBBB0000000000000000000000000000000000002";

    #[test]
    fn test_csv_parsing() {
        let path = PathBuf::from("./test_fixtures/recipients.csv");
        let list = RecipientList::new_from_file(&path).expect("Failed to parse CSV");

        assert_eq!(list.len(), 3);
        assert_eq!(
            list.as_slice()[0].address,
            "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4"
        );
        assert_eq!(list.as_slice()[0].amount, "100");
        assert_eq!(list.as_slice()[2].amount, "0.25");
    }

    #[test]
    fn test_incomplete_rows_are_dropped() {
        let data = format!("address,amount\n{AAA},10\n,5\n{BBB},\n");
        let list = RecipientList::from_reader(data.as_bytes()).unwrap();

        assert_eq!(list.as_slice(), &[Recipient::new(AAA, "10")]);
    }

    #[test]
    fn test_header_is_case_insensitive() {
        let data = format!("Amount,ADDRESS\n7,{AAA}\n");
        let list = RecipientList::from_reader(data.as_bytes()).unwrap();

        assert_eq!(list.as_slice(), &[Recipient::new(AAA, "7")]);
    }

    #[test]
    fn test_missing_column() {
        let result = RecipientList::from_reader("wallet,amount\n0x1,2\n".as_bytes());
        assert!(matches!(
            result,
            Err(RecipientFileError::MissingColumn("address"))
        ));
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let list = RecipientList::new(vec![Recipient::new(AAA, "10"), Recipient::new(BBB, "20")]);

        let mut buf = Vec::new();
        list.to_writer(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            format!("address,amount\n{AAA},10\n{BBB},20\n")
        );

        let imported = RecipientList::from_reader(buf.as_slice()).unwrap();
        assert_eq!(imported, list);
    }

    #[test]
    fn test_manual_editing() {
        let mut list = RecipientList::default();
        let index = list.push_empty();
        assert!(list.update_address(index, AAA));
        assert!(list.update_amount(index, "1.5"));
        assert!(!list.update_amount(4, "1"));
        list.push(Recipient::new(BBB, "2"));

        assert_eq!(list.total_amount(6).unwrap(), U256::from(3_500_000u64));
        assert_eq!(list.remove(0), Some(Recipient::new(AAA, "1.5")));
        assert_eq!(list.remove(9), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_total_amount_overflow_is_an_error() {
        let half = (U256::from(1u64) << 255usize).to_string();
        let list = RecipientList::new(vec![
            Recipient::new(AAA, half.clone()),
            Recipient::new(BBB, half),
        ]);
        assert_eq!(list.total_amount(0), Err(ValidationError::TotalOverflow));
    }

    #[test]
    fn test_total_amount_reports_bad_row() {
        let list = RecipientList::new(vec![Recipient::new(AAA, "1"), Recipient::new(BBB, "x")]);
        assert!(matches!(
            list.total_amount(6),
            Err(ValidationError::InvalidAmount { index: 1, .. })
        ));
    }
}
