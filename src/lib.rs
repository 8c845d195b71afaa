//! Task list with deadlines, filters and live countdowns.
//!
//! Tasks are kept in a single storage slot and rewritten in full after every
//! change. The interactive view rebuilds its list from storage on each change
//! and runs one countdown per visible task.

pub mod commands;
pub mod config;
pub mod countdown;
pub mod error;
pub mod filter;
pub mod models;
pub mod storage;
pub mod store;
pub mod tui;
pub mod view;

pub use error::{Error, Result};
