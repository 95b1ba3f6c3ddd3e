//! Pure Rust async implementation of the [webrcon protocol](https://wiki.facepunch.com/rust/Rcon) used by Rust game servers.
pub mod client;
pub mod error;
pub mod frame;
pub mod server;
