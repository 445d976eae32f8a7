use crate::*;

pub async fn process_leaderboard(args: &Args, leaderboard_args: &LeaderboardArgs) -> Result<()> {
    let query = LeaderboardQuery {
        page: leaderboard_args.page,
        limit: leaderboard_args.limit,
        sort_field: leaderboard_args.sort_field,
        sort_direction: leaderboard_args.sort_direction,
        time_filter: leaderboard_args.time_filter,
    };

    let view = args.api_client().leaderboard_view(&query).await;
    if let Some(reason) = &view.fallback {
        warn!("showing sample data: {}", reason);
    }

    let first = (view.page.page.saturating_sub(1) as u64) * view.page.limit as u64;
    for (i, entry) in view.page.data.iter().enumerate() {
        println!(
            "{:>3}. {}  {} {}  {} wallets  {}",
            first + i as u64 + 1,
            entry.wallet_address,
            entry.total_amount_sent,
            entry.token_symbol,
            entry.wallets_reached,
            entry.last_activity.format("%Y-%m-%d")
        );
    }
    println!(
        "page {} of {} ({} entries)",
        view.page.page,
        view.page.total.div_ceil(view.page.limit.max(1) as u64).max(1),
        view.page.total
    );
    Ok(())
}
