//! User accounts and the login session.
//!
//! Credentials are compared in plaintext: the username case-insensitively,
//! the password exactly. Any mismatch produces the same
//! [`Error::InvalidCredentials`] so callers cannot tell which field was wrong.

use crate::{
    entities::user,
    errors::{Error, Result},
    models::{CrudAction, User},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// The logged-in user, if any. Passed explicitly to operations that need an actor.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<User>,
}

impl Session {
    /// A session with nobody logged in.
    #[must_use]
    pub const fn new() -> Self {
        Self { current_user: None }
    }

    /// The logged-in user.
    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// The logged-in user, or an error when nobody is logged in.
    pub fn actor(&self) -> Result<&User> {
        self.current_user.as_ref().ok_or(Error::InvalidCredentials)
    }

    /// Clears the logged-in user.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!("User {} logged out", user.username);
        }
    }
}

fn user_from_model(model: user::Model) -> Result<User> {
    Ok(User {
        role: model.role.parse()?,
        id: model.id,
        username: model.username,
        password: model.password,
        name: model.name,
        email: model.email,
        department: model.department,
    })
}

fn to_active_model(user: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(user.id.clone()),
        username: Set(user.username.clone()),
        password: Set(user.password.clone()),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        role: Set(user.role.as_str().to_string()),
        department: Set(user.department.clone()),
    }
}

pub(crate) async fn insert_user<C>(conn: &C, user: &User) -> Result<()>
where
    C: ConnectionTrait,
{
    to_active_model(user).insert(conn).await?;
    Ok(())
}

/// Retrieves all users ordered by username.
pub async fn list_users<C>(conn: &C) -> Result<Vec<User>>
where
    C: ConnectionTrait,
{
    user::Entity::find()
        .order_by_asc(user::Column::Username)
        .all(conn)
        .await?
        .into_iter()
        .map(user_from_model)
        .collect()
}

/// Authenticates against the stored users and records the user in the session.
pub async fn login(
    db: &DatabaseConnection,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<User> {
    let wanted = username.to_lowercase();
    let user = list_users(db)
        .await?
        .into_iter()
        .find(|user| user.username.to_lowercase() == wanted);

    match user {
        Some(user) if user.password == password => {
            info!("User {} logged in", user.username);
            session.current_user = Some(user.clone());
            Ok(user)
        }
        _ => {
            warn!("Rejected login attempt for {}", username);
            Err(Error::InvalidCredentials)
        }
    }
}

/// Creates, replaces or deletes a user account.
///
/// Updating the logged-in user refreshes the session copy; deleting the
/// logged-in user logs the session out.
pub async fn manage_user(
    db: &DatabaseConnection,
    session: &mut Session,
    action: CrudAction,
    user: User,
) -> Result<User> {
    if action != CrudAction::Delete
        && (user.username.trim().is_empty()
            || user.password.is_empty()
            || user.name.trim().is_empty())
    {
        return Err(Error::validation(
            "Username, Password, Name and Role are required.",
        ));
    }

    let existing = user::Entity::find_by_id(user.id.clone()).one(db).await?;
    let is_current = session
        .current_user()
        .is_some_and(|current| current.id == user.id);

    match action {
        CrudAction::Create => {
            if existing.is_some() {
                return Err(Error::validation(format!("User {} already exists.", user.id)));
            }
            let wanted = user.username.to_lowercase();
            if list_users(db)
                .await?
                .iter()
                .any(|other| other.username.to_lowercase() == wanted)
            {
                return Err(Error::validation(format!(
                    "Username {} is already taken.",
                    user.username
                )));
            }
            insert_user(db, &user).await?;
            info!("Created user {}", user.username);
            Ok(user)
        }
        CrudAction::Update => {
            if existing.is_none() {
                return Err(Error::not_found("User", &user.id));
            }
            to_active_model(&user).update(db).await?;
            if is_current {
                session.current_user = Some(user.clone());
            }
            info!("Updated user {}", user.username);
            Ok(user)
        }
        CrudAction::Delete => {
            let existing = existing.ok_or_else(|| Error::not_found("User", &user.id))?;
            user::Entity::delete_by_id(existing.id.clone()).exec(db).await?;
            info!("Deleted user {}", existing.username);
            if is_current {
                session.logout();
            }
            user_from_model(existing)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::UserRole;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_login_is_case_insensitive_on_username() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "admin", UserRole::Admin).await?;
        let mut session = Session::new();

        let user = login(&db, &mut session, "ADMIN", "123").await?;
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(session.current_user().unwrap().id, "u1");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "admin", UserRole::Admin).await?;
        let mut session = Session::new();

        let wrong_password = login(&db, &mut session, "admin", "nope").await;
        let wrong_user = login(&db, &mut session, "nobody", "123").await;
        let padded_user = login(&db, &mut session, " admin ", "123").await;

        assert!(matches!(wrong_password, Err(Error::InvalidCredentials)));
        assert!(matches!(wrong_user, Err(Error::InvalidCredentials)));
        assert!(matches!(padded_user, Err(Error::InvalidCredentials)));
        assert!(session.current_user().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_current_user_logs_out() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "u1", "admin", UserRole::Admin).await?;
        let mut session = Session::new();
        login(&db, &mut session, "admin", "123").await?;

        manage_user(&db, &mut session, CrudAction::Delete, admin).await?;

        assert!(session.current_user().is_none());
        assert!(list_users(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_updating_current_user_refreshes_session() -> Result<()> {
        let db = setup_test_db().await?;
        let mut admin = create_test_user(&db, "u1", "admin", UserRole::Admin).await?;
        let mut session = Session::new();
        login(&db, &mut session, "admin", "123").await?;

        admin.name = "Chief Administrator".to_string();
        manage_user(&db, &mut session, CrudAction::Update, admin).await?;

        assert_eq!(session.current_user().unwrap().name, "Chief Administrator");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "admin", UserRole::Admin).await?;
        let mut session = Session::new();

        let mut clash = test_user("u2", "Admin", UserRole::User);
        clash.email = "other@example.com".to_string();
        let result = manage_user(&db, &mut session, CrudAction::Create, clash).await;

        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
