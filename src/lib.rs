pub mod config;
pub mod http_client;
pub mod normalize;
pub mod player_compare;
pub mod player_score;
pub mod points;
pub mod provider;
pub mod role;
pub mod team_compare;
pub mod ttl_cache;
pub mod verdict;

pub use provider::{ApiFootballFeed, FeedError, StatsFeed};
pub use verdict::{BreakdownItem, Verdict, Winner};
