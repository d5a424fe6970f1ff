//! Cart persistence over the customer's session.
//!
//! The cart snapshot is stored as a JSON string under the session key
//! [`CartStore::KEY`], so a corrupted value degrades to an empty cart instead
//! of failing the request.

use std::future::Future;

use isra_cafe_core::{CartStore, SnapshotStore};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

/// [`SnapshotStore`] backed by a `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct SessionSnapshots {
    session: Session,
}

impl SessionSnapshots {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl SnapshotStore for SessionSnapshots {
    type Error = SessionError;

    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send {
        async move {
            match self.session.get::<String>(key).await {
                Ok(snapshot) => Ok(snapshot),
                Err(SessionError::SerdeJson(e)) => {
                    tracing::warn!(key, error = %e, "Ignoring non-string session snapshot");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
    }

    fn save(&self, key: &str, snapshot: String) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move { self.session.insert(key, snapshot).await }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move {
            self.session.remove_value(key).await?;
            Ok(())
        }
    }
}

/// Hydrate the cart stored in `session`.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<CartStore<SessionSnapshots>, SessionError> {
    CartStore::hydrate(SessionSnapshots::new(session.clone())).await
}
