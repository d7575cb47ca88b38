//! Command implementations.

pub(crate) mod audit;
pub(crate) mod config;
pub(crate) mod password;
pub(crate) mod user;
