//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use registrar_core::ports::{RecordStore, TokenService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Both ports are trait objects so tests can inject an in-memory
/// store and a throwaway token signer.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub tokens: Arc<dyn TokenService>,
}
