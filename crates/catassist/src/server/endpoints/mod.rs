pub mod audit;
pub mod auth;
pub mod chat;
pub mod classes;
pub mod plan;
pub mod status;
pub mod student;
