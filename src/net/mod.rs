//! Network layer: wire types, the backend seam, and the HTTP transport.

pub mod api;
pub mod http;
pub mod resources;
pub mod types;
