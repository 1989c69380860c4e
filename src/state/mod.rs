//! Shared client-side state.
//!
//! DESIGN
//! ======
//! `session` is the in-memory identity snapshot; `storage` is what survives a
//! restart. Only the auth gateway writes either.

pub mod session;
pub mod storage;
