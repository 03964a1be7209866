//! Transport-specific endpoint connectors.
//!
//! ```text
//! ┌──────────────┐ acquire ┌──────────────┐ read_chunk ┌──────────────┐
//! │ Connector    │────────▶│ ByteSource   │───────────▶│ CaptureLoop  │
//! │ tcp/udp/http │         │ (one session)│            │              │
//! └──────────────┘         └──────────────┘            └──────────────┘
//! ```

pub mod connector;
pub mod http;
pub mod tcp;
pub mod udp;

pub use connector::{ByteSource, Connector, StreamSource};
pub use http::HttpConnector;
pub use tcp::TcpConnector;
pub use udp::UdpConnector;
