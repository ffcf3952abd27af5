//! Network and I/O helpers: DNS resolution, SMTP probing, geolocation,
//! proxy rotation and input-file ingestion.

pub mod dns;
pub mod geo;
pub mod input;
pub mod proxy;
pub mod smtp;
