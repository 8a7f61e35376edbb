pub mod constants;
pub mod envelope;
pub mod error;

pub use constants::WILDCARD;
pub use envelope::Envelope;
pub use error::{FeedError, ProtocolError, Result};
