pub mod client;
pub mod config;
pub mod credentials;
pub mod flatten;
pub mod rate;
pub mod store;
pub mod transport;
pub mod util;

pub use client::{ClientError, RiotClient, UserRef};
pub use config::{ClientConfig, GateConfig, WindowConfig};
pub use credentials::ApiKey;
pub use flatten::{process_matches, FlattenError, Table};
pub use rate::{RateGate, RateWindow, WindowUsage};
pub use store::MatchStore;
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
