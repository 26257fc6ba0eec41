pub mod client;
pub mod config;
pub mod domains;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod providers;
pub mod services;

pub use crate::client::Connector;
pub use crate::config::Config;
pub use crate::error::{ConnectorError, Result};
pub use crate::services::message::{KindSpec, MessageService};
pub use crate::services::negotiation::{NegotiationOutcome, NegotiationPipeline};
