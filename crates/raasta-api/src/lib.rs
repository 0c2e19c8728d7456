// raasta-api: Async Rust client for the Smart Raasta roadmap service

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod roadmap;
pub mod transport;

pub use client::RaastaClient;
pub use error::Error;
pub use models::{GenerateRequest, LoadResponse, SendOtpResponse, VerifyOtpResponse};
pub use transport::{TlsMode, TransportConfig};
