//! Command-line front end for the outreach workflow.
pub mod cli;
pub mod config;
pub mod driver;
pub mod effects;
pub mod logging;
pub mod render;
