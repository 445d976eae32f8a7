pub mod client;
pub mod error;
pub mod handler;
pub mod leaderboard;
pub mod types;

pub use client::AirdropApiClient;
pub use error::ApiError;
pub use handler::PersistHandler;

pub type Result<T> = std::result::Result<T, ApiError>;
