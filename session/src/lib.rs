//! Race session driver: game modes, host/joiner authority, peer sync and
//! the commentary contract around the core simulation.

pub mod commentary;
pub mod config;
pub mod error;
pub mod race_session;
pub mod replication;


pub use commentary::*;
pub use config::*;
pub use error::*;
pub use race_session::*;
pub use replication::*;
