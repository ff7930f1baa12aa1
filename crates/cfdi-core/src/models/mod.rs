//! Data models for extracted records and configuration.

pub mod cfdi;
pub mod config;
