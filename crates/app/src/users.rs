//! Account creation.

use crate::app::App;
use crate::error::{AppError, AppResult};
use leaflet_core::{Ident, Identity, User, UserKind};
use regex::Regex;
use std::sync::LazyLock;

static USER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{3,}$").expect("user name pattern is valid"));

/// Whether `name` is acceptable as a user name.
pub fn is_valid_user_name(name: &str) -> bool {
    USER_NAME.is_match(name)
}

impl App {
    /// Create a user named `user_name` and link `ident` to it.
    ///
    /// The name check, the user and the identity are written in one
    /// transaction.
    pub async fn create_user(&self, ident: Ident, user_name: &str) -> AppResult<User> {
        if !is_valid_user_name(user_name) {
            return Err(AppError::validation(
                "name",
                "use at least 3 characters from a-z, 0-9, '_' and '-'",
            ));
        }

        let user = User {
            name: user_name.to_string(),
            kind: UserKind::User,
            full_name: user_name.to_string(),
        };
        let identity = Identity {
            ident,
            user_name: user.name.clone(),
        };

        let stored = user.clone();
        self.tx(move |repo| {
            Box::pin(async move {
                if repo.find_user(&stored.name).await? {
                    return Err(AppError::AlreadyExists {
                        entity: "user",
                        id: stored.name,
                    });
                }
                match repo.get_identity(&identity.ident).await {
                    Ok(existing) => {
                        return Err(AppError::AlreadyExists {
                            entity: "identity",
                            id: format!("{} -> {}", identity.ident, existing.user_name),
                        });
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e.into()),
                }
                repo.store_user(&stored).await?;
                repo.store_identity(&identity).await?;
                Ok(())
            })
        })
        .await?;

        tracing::info!(user_name = %user.name, "user created");
        Ok(user)
    }
}
