//! Startup promotion of a configured administrator

use tracing::{info, warn};

use crate::domain::{DomainResult, UserRepositoryInterface, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeedOutcome {
    Promoted,
    AlreadyAdmin,
    NotFound,
}

/// Grant the `admin` role to the user registered under `email`.
pub async fn promote_admin(
    users: &dyn UserRepositoryInterface,
    email: &str,
) -> DomainResult<AdminSeedOutcome> {
    let Some(user) = users.get_user_by_email(email).await? else {
        warn!(email = %email, "Admin user not found; nothing to promote");
        return Ok(AdminSeedOutcome::NotFound);
    };

    if user.role == UserRole::Admin {
        info!(user_id = %user.id, "User is already an admin");
        return Ok(AdminSeedOutcome::AlreadyAdmin);
    }

    users.update_user_role(&user.id, UserRole::Admin).await?;
    info!(user_id = %user.id, email = %email, "Promoted user to admin");
    Ok(AdminSeedOutcome::Promoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateUserDto;
    use crate::infrastructure::storage::InMemoryUserRepository;

    #[tokio::test]
    async fn promotes_once_then_reports_already_admin() {
        let users = InMemoryUserRepository::new();
        users
            .create_user(CreateUserDto {
                email: "root@example.com".into(),
                name: "Root".into(),
                image: None,
                email_verified: true,
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(
            promote_admin(&users, "root@example.com").await.unwrap(),
            AdminSeedOutcome::Promoted
        );
        assert_eq!(
            promote_admin(&users, "root@example.com").await.unwrap(),
            AdminSeedOutcome::AlreadyAdmin
        );

        let user = users.get_user_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let users = InMemoryUserRepository::new();
        assert_eq!(
            promote_admin(&users, "ghost@example.com").await.unwrap(),
            AdminSeedOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn store_failure_is_an_error() {
        let users = InMemoryUserRepository::new();
        users.set_failing(true);
        assert!(promote_admin(&users, "root@example.com").await.is_err());
    }
}
