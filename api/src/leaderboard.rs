use chrono::{DateTime, TimeZone, Utc};
use hyperdrop_core::{units::parse_amount, U256};

use crate::types::{LeaderboardEntry, LeaderboardPage, LeaderboardQuery, SortDirection, SortField};

/// A leaderboard page, possibly served from the local sample because the
/// backend could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardView {
    pub page: LeaderboardPage,
    /// Why the backend result was replaced, if it was
    pub fallback: Option<String>,
}

impl LeaderboardView {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

fn sample_entry(
    wallet_address: &str,
    total_amount_sent: &str,
    wallets_reached: u64,
    token_address: &str,
    token_symbol: &str,
    last_activity: DateTime<Utc>,
) -> LeaderboardEntry {
    LeaderboardEntry {
        wallet_address: wallet_address.to_string(),
        total_amount_sent: total_amount_sent.to_string(),
        wallets_reached,
        token_address: token_address.to_string(),
        token_symbol: token_symbol.to_string(),
        last_activity,
    }
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// Fixed sample shown when the backend is unavailable.
pub fn sample_entries() -> Vec<LeaderboardEntry> {
    vec![
        sample_entry(
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "50000",
            1250,
            "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
            "USDT",
            at(10, 10, 30),
        ),
        sample_entry(
            "0xde709f2102306220921060314715629080e2fb77",
            "35000",
            890,
            "0x27b1fdb04752bbc536007a920d24acb045561c26",
            "USDC",
            at(9, 15, 45),
        ),
        sample_entry(
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "28000",
            1100,
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "WETH",
            at(8, 9, 15),
        ),
        sample_entry(
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "42000",
            750,
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
            "UNI",
            at(11, 14, 20),
        ),
        sample_entry(
            "0x8ba1f109551bD432803012645Ac136ddd64DBA72",
            "18500",
            2100,
            "0x001d3F1ef827552Ae1114027BD3ECF1f086bA0F9",
            "MATIC",
            at(7, 11, 45),
        ),
    ]
}

fn amount_key(entry: &LeaderboardEntry) -> U256 {
    // ranking only needs a stable order; amounts are compared at 18 decimals
    parse_amount(&entry.total_amount_sent, 18).unwrap_or(U256::ZERO)
}

pub fn sort_entries(entries: &mut [LeaderboardEntry], field: SortField, direction: SortDirection) {
    entries.sort_by(|a, b| {
        let ordering = match field {
            SortField::TotalAmountSent => amount_key(a).cmp(&amount_key(b)),
            SortField::WalletsReached => a.wallets_reached.cmp(&b.wallets_reached),
            SortField::WalletAddress => a
                .wallet_address
                .to_lowercase()
                .cmp(&b.wallet_address.to_lowercase()),
            SortField::LastActivity => a.last_activity.cmp(&b.last_activity),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// The sample, sorted and paginated like the backend would. A page past the
/// end of the sample yields the whole sample as page 1, so a fallback is
/// never empty.
pub fn sample_page(query: &LeaderboardQuery) -> LeaderboardPage {
    let mut entries = sample_entries();
    sort_entries(&mut entries, query.sort_field, query.sort_direction);

    let total = entries.len() as u64;
    let limit = query.limit.max(1) as usize;
    let page = query.page.max(1);
    let start = (page as usize - 1).saturating_mul(limit);

    if start >= entries.len() {
        return LeaderboardPage {
            data: entries,
            total,
            page: 1,
            limit: limit as u32,
        };
    }

    LeaderboardPage {
        data: entries.into_iter().skip(start).take(limit).collect(),
        total,
        page,
        limit: limit as u32,
    }
}
