//! Authenticated session core
//!
//! The three pieces the request pipeline is built on:
//!
//! - [`CredentialStore`] — durable holder of the access/renewal pair,
//!   single source of truth for the `Authorization` header.
//! - [`RenewalCoordinator`] — single-flight refresh protocol with FIFO
//!   broadcast to concurrent callers.
//! - [`TokenStorage`] — persistence seam (platform keychain in
//!   production, in-memory in tests).

pub mod coordinator;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use coordinator::{RenewalCoordinator, RenewalError};
pub use storage::{KeyringStorage, StorageError, TokenStorage};
pub use store::CredentialStore;
