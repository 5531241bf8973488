//! Database layer
//!
//! SQLite through a shared sqlx pool. The pool is created once at startup
//! and handed to every request handler.

pub mod channels;
pub mod init;
pub mod models;

pub use channels::{channel_exists, channels_created_by, insert_channel, InsertOutcome};
pub use init::{init_database, init_in_memory_database};
pub use models::ChannelRecord;
