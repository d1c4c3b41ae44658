pub mod analytics;
pub mod config;
pub mod content;
pub mod decoder;
pub mod error;
pub mod sanitize;
pub mod session;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use analytics::{Analytics, AnalyticsEvent, AnalyticsSink, MeasurementProtocolSink};
pub use config::Config;
pub use content::{Portfolio, PortfolioItem, SubContent};
pub use error::ChatError;
pub use sanitize::sanitize_description;
pub use session::{ChatSession, ERROR_MESSAGE, EXAMPLE_QUESTIONS};
pub use state::{ChatRole, Message, MessageId, SessionState};
pub use transport::{ChatTransport, ChunkStream, Deployment, HttpTransport};
