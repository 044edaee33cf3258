//! HTTP implementation of the middleware client seam.

pub mod client;
pub mod header;

pub use client::XiHttpClient;
pub use header::build_xi_header;
