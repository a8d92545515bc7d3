//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::user::AccountService;

/// Shared handler state. Collaborators are built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
}

impl AppState {
    pub fn new(account_service: Arc<AccountService>) -> Self {
        Self { account_service }
    }
}
