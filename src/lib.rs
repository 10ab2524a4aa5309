mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod interpreter;
pub mod model;
pub mod server;
mod utils;

#[cfg(test)]
mod test;

pub use api::{Delivery, Ledger, Mode, TestMessenger, UserNames, UNSET_NAME};
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use error::{Invalid, PayloadError};
