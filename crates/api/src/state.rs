use std::sync::Arc;

use parlor_auth::{Authenticator, SessionResolver, User};
use parlor_chats::ChatServices;
use parlor_database::DatabaseConnection;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<dyn SessionResolver>,
    chats: ChatServices,
    database: Option<DatabaseConnection>,
}

impl AppState {
    /// State over arbitrary collaborators; used with in-memory fakes.
    pub fn new(sessions: Arc<dyn SessionResolver>, chats: ChatServices) -> Self {
        Self {
            sessions,
            chats,
            database: None,
        }
    }

    /// Production wiring: sessions and chat storage share one SQLite pool.
    pub fn from_database(
        database: DatabaseConnection,
        authenticator: Authenticator,
        chats: ChatServices,
    ) -> Self {
        Self {
            sessions: Arc::new(authenticator),
            chats,
            database: Some(database),
        }
    }

    pub fn chats(&self) -> &ChatServices {
        &self.chats
    }

    pub fn database(&self) -> Option<&DatabaseConnection> {
        self.database.as_ref()
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        self.sessions
            .resolve_session(token)
            .await
            .map_err(ApiError::from)
    }
}
