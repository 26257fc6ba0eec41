pub mod contract;
pub mod message;
