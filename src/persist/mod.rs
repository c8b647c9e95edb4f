//! Persistence scheduling: when note state reaches the gateway.

mod debounce;
mod writer;

pub use debounce::Debouncer;
pub use writer::{PersistenceWriter, RetryPolicy, WriteQueue};
