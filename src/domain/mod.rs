// Domain layer - Pure data and business rules, no I/O
pub mod error;
pub mod forecast;
pub mod leaderboard;
pub mod sales;
pub mod summary;
