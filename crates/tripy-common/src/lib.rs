pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, StoreError, TripyError};
pub use id::{new_correlation_id, new_id, SessionId};
pub use types::{Role, Turn};

pub type Result<T> = std::result::Result<T, TripyError>;
