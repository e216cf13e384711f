pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::CliConfig;
pub use core::batch::BatchRunner;
pub use core::query::QueryEngine;
pub use core::retry::Retryer;
pub use core::token::TokenManager;
pub use domain::model::{BatchReport, Category, Credential, TargetOutcomes};
pub use utils::error::{IcpError, Result};
