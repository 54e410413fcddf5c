use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::BootstrapAdmin;
use crate::db::Db;

/// Seed accounts at startup. Safe to call on every boot: existence is
/// checked before inserting.
pub async fn seed_accounts(pool: &Db, bootstrap: Option<&BootstrapAdmin>) -> anyhow::Result<()> {
    if let Some(admin) = bootstrap {
        reconcile_bootstrap_admin(pool, admin).await?;
    }

    Ok(())
}

/// Align the user store with the file-defined bootstrap admin: create the
/// account when enabled and missing, otherwise make its admin flag follow
/// the `enabled` switch. Also invoked by the admin toggle endpoint.
pub async fn reconcile_bootstrap_admin(pool: &Db, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    #[derive(sqlx::FromRow)]
    struct AdminRow {
        id:       String,
        is_admin: bool,
    }

    let row: Option<AdminRow> = sqlx::query_as::<_, AdminRow>(
        "SELECT id, is_admin FROM users WHERE username = ? LIMIT 1",
    )
    .bind(&admin.username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => {
            if r.is_admin != admin.enabled {
                sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
                    .bind(admin.enabled)
                    .bind(&r.id)
                    .execute(pool)
                    .await?;
                tracing::info!(
                    username = %admin.username,
                    enabled = admin.enabled,
                    "Reconciled bootstrap admin flag"
                );
            }
        }

        None if admin.enabled => {
            let hash = hash_password(&admin.password)?;
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO users (id, username, email, password_hash, is_admin)
                 VALUES (?, ?, ?, ?, 1)",
            )
            .bind(id)
            .bind(&admin.username)
            .bind(&admin.email)
            .bind(hash)
            .execute(pool)
            .await?;
            tracing::info!(username = %admin.username, "Seeded bootstrap admin account");
        }

        // Disabled and absent: nothing to create.
        None => {}
    }

    Ok(())
}
