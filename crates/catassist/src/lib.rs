//! Student advising service: degree progress, next-semester planning and chat.

pub mod audit;
pub mod chat;
pub mod config;
pub mod db;
pub mod logging;
pub mod planner;
pub mod server;
pub mod session;
pub mod types;
