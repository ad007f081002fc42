//! Shared application state.

use ldapgw_directory::DirectoryGateway;
use std::sync::Arc;

/// State handed to every handler: the directory gateway with its
/// startup-resolved trust strategy.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<DirectoryGateway>,
}

impl AppState {
    /// Wraps a gateway for sharing across handlers.
    #[must_use]
    pub fn new(gateway: DirectoryGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// The directory gateway.
    #[must_use]
    pub fn gateway(&self) -> &DirectoryGateway {
        &self.gateway
    }
}
