pub mod process_allowance;
pub mod process_approve;
pub mod process_create_dummy_csv;
pub mod process_export_csv;
pub mod process_history;
pub mod process_leaderboard;
pub mod process_send;
pub mod process_set_status;
pub mod process_token_info;
pub mod process_validate_csv;

pub use process_allowance::*;
pub use process_approve::*;
pub use process_create_dummy_csv::*;
pub use process_export_csv::*;
pub use process_history::*;
pub use process_leaderboard::*;
pub use process_send::*;
pub use process_set_status::*;
pub use process_token_info::*;
pub use process_validate_csv::*;
