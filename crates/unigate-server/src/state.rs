//! Shared application state.

use std::sync::Arc;

use surrealdb::engine::remote::ws::Client;
use unigate_auth::service::AccountService;
use unigate_auth::{InMemoryLoginAttemptTracker, SmtpOtpSender};
use unigate_db::repository::{SurrealProfileRepository, SurrealUserRepository};

/// Concrete account-service wiring used by the HTTP layer.
pub type Accounts = AccountService<
    SurrealUserRepository<Client>,
    SurrealProfileRepository<Client>,
    SmtpOtpSender,
    InMemoryLoginAttemptTracker,
>;

pub struct AppState {
    pub accounts: Accounts,
}

pub type SharedState = Arc<AppState>;
