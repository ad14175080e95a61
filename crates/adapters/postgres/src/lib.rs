//! pgprov-adapter-postgres - PostgreSQL 适配器

mod config;
mod connection;
mod discovery;
mod executor;

pub use config::*;
pub use connection::*;
pub use discovery::*;
pub use executor::*;
