//! Room-booking client: session gate, role-based routes and resource screens.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! services::auth ──▶ state::session ──▶ routes::guard ──▶ routes::{navigator, nav}
//!        │                                                    │
//!        ▼                                                    ▼
//!   net::http ◀──────────────── net::resources ◀──────── screens
//! ```
//!
//! The auth gateway is the only writer of the session and the persisted
//! token. Everything else reads the session through a handle and reaches the
//! backend through [`app::AppContext`].

pub mod app;
pub mod config;
pub mod net;
pub mod routes;
pub mod screens;
pub mod services;
pub mod state;
