pub mod charts;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod http_cache;
pub mod http_client;
pub mod player_stats;
pub mod season_cache;
pub mod state;
pub mod stats_fetch;
