pub mod http;
pub mod identity;
pub mod memory;
pub mod multipart;
