//! Core types shared across the crate: configuration, errors, data models.

pub mod config;
pub mod error;
pub mod models;
