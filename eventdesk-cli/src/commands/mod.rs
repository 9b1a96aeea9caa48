pub mod add;
pub mod config;
pub mod edit;
pub mod list;
pub mod remove;
pub mod show;
pub mod stats;
pub mod user;
