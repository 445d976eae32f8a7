use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use hyperdrop_core::{events::DistributionConfirmed, recipient::Recipient, token::TokenReference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "completed" => Ok(RecordStatus::Completed),
            "failed" => Ok(RecordStatus::Failed),
            other => Err(format!("unknown status {other:?}")),
        }
    }
}

/// Body of `POST /api/airdrops`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAirdropRequest {
    pub from_address: String,
    pub token_address: String,
    pub token_symbol: String,
    pub recipients: Vec<Recipient>,
    pub total_amount: String,
    pub tx_hash: String,
    pub timestamp: DateTime<Utc>,
    pub total_recipients: usize,
    pub status: RecordStatus,
}

impl From<&DistributionConfirmed> for SaveAirdropRequest {
    fn from(event: &DistributionConfirmed) -> Self {
        Self {
            from_address: event.from_address.to_string(),
            token_address: event.token.to_string(),
            token_symbol: event.token_symbol.clone(),
            recipients: event.recipients.clone(),
            total_amount: event.total_amount.clone(),
            tx_hash: event.tx_hash.to_string(),
            timestamp: event.confirmed_at,
            total_recipients: event.recipients.len(),
            status: RecordStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAirdropResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RecordStatus,
}

/// A completed distribution as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRecord {
    pub id: String,
    pub from_address: String,
    pub token_address: String,
    pub token_symbol: String,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub total_recipients: usize,
    pub total_amount: String,
    pub tx_hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl DistributionRecord {
    pub fn token(&self) -> Option<TokenReference> {
        TokenReference::from_str(&self.token_address).ok()
    }

    pub fn recipient_count(&self) -> usize {
        self.total_recipients.max(self.recipients.len())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub data: Vec<DistributionRecord>,
}

/// One row per (sender, token) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub wallet_address: String,
    pub total_amount_sent: String,
    pub wallets_reached: u64,
    pub token_address: String,
    pub token_symbol: String,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub data: Vec<LeaderboardEntry>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    TotalAmountSent,
    WalletsReached,
    WalletAddress,
    LastActivity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFilter {
    #[default]
    #[serde(rename = "all-time")]
    AllTime,
    #[serde(rename = "7-days")]
    SevenDays,
    #[serde(rename = "24-hours")]
    TwentyFourHours,
}

/// Query string of `GET /api/leaderboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub time_filter: TimeFilter,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
            time_filter: TimeFilter::default(),
        }
    }
}

// FromStr impls so the query enums can be taken straight from the command line

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalAmountSent" | "total-amount" => Ok(SortField::TotalAmountSent),
            "walletsReached" | "wallets" => Ok(SortField::WalletsReached),
            "walletAddress" | "wallet" => Ok(SortField::WalletAddress),
            "lastActivity" | "last-activity" => Ok(SortField::LastActivity),
            other => Err(format!("unknown sort field {other:?}")),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction {other:?}")),
        }
    }
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-time" => Ok(TimeFilter::AllTime),
            "7-days" => Ok(TimeFilter::SevenDays),
            "24-hours" => Ok(TimeFilter::TwentyFourHours),
            other => Err(format!("unknown time filter {other:?}")),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use hyperdrop_core::{Address, TxHash};

    use super::*;

    #[test]
    fn test_save_request_from_event() {
        let event = DistributionConfirmed {
            from_address: Address::repeat_byte(0x11),
            token: TokenReference::Native,
            token_symbol: "ETH".to_string(),
            recipients: vec![
                Recipient::new("0x5B38Da6a701c568545dCfcB03FcB875f56beddC4", "1"),
                Recipient::new("0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2", "2"),
            ],
            total_amount: "3".to_string(),
            tx_hash: TxHash::repeat_byte(0xab),
            confirmed_at: Utc::now(),
        };

        let request = SaveAirdropRequest::from(&event);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["tokenAddress"], "native");
        assert_eq!(json["totalRecipients"], 2);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["txHash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(json["recipients"][1]["amount"], "2");
    }

    #[test]
    fn test_deserialize_history_record() {
        let json = r#"{
            "id": "65a1",
            "fromAddress": "0x1111111111111111111111111111111111111111",
            "tokenAddress": "native",
            "tokenSymbol": "ETH",
            "totalRecipients": 12,
            "totalAmount": "150.5",
            "txHash": "0xabc",
            "timestamp": "2025-01-10T10:30:00.000Z"
        }"#;
        let record: DistributionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.status, RecordStatus::Completed);
        assert_eq!(record.recipient_count(), 12);
        assert_eq!(record.token(), Some(TokenReference::Native));
        assert_eq!(record.timestamp.to_rfc3339(), "2025-01-10T10:30:00+00:00");
    }

    #[test]
    fn test_query_enums_parse() {
        assert_eq!("wallets".parse::<SortField>(), Ok(SortField::WalletsReached));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("7-days".parse::<TimeFilter>(), Ok(TimeFilter::SevenDays));
        assert!("weekly".parse::<TimeFilter>().is_err());
    }
}
