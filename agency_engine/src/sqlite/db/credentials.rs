use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use super::column_error;
use crate::{
    admin_api::credential_objects::CredentialQueryFilter,
    db_types::{CredentialUpdate, NewPaymentCredential, PaymentCredential},
};

impl FromRow<'_, SqliteRow> for PaymentCredential {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let provider: String = row.try_get("provider")?;
        let environment: String = row.try_get("environment")?;
        let secret_key: String = row.try_get("secret_key")?;
        Ok(Self {
            id: row.try_get("id")?,
            provider: provider.parse().map_err(|e| column_error("provider", e))?,
            public_key: row.try_get("public_key")?,
            secret_key: secret_key.into(),
            is_active: row.try_get("is_active")?,
            environment: environment.parse().map_err(|e| column_error("environment", e))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fetches credentials matching the filter, newest first.
pub async fn fetch_credentials(
    query: CredentialQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentCredential>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM payment_settings ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(is_active) = query.is_active {
        where_clause.push("is_active = ");
        where_clause.push_bind_unseparated(is_active);
    }
    if let Some(provider) = query.provider {
        where_clause.push("provider = ");
        where_clause.push_bind_unseparated(provider.to_string());
    }
    if let Some(environment) = query.environment {
        where_clause.push("environment = ");
        where_clause.push_bind_unseparated(environment.to_string());
    }
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(query.limit);
    trace!("🔑️ Executing query: {}", builder.sql());
    let credentials = builder.build_query_as::<PaymentCredential>().fetch_all(conn).await?;
    trace!("🔑️ Result of fetch_credentials: {} records", credentials.len());
    Ok(credentials)
}

pub async fn fetch_credential(id: i64, conn: &mut SqliteConnection) -> Result<Option<PaymentCredential>, sqlx::Error> {
    let credential =
        sqlx::query_as("SELECT * FROM payment_settings WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(credential)
}

pub async fn insert_credential(
    credential: NewPaymentCredential,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<PaymentCredential, sqlx::Error> {
    let credential: PaymentCredential = sqlx::query_as(
        r#"
            INSERT INTO payment_settings (
                provider,
                public_key,
                secret_key,
                is_active,
                environment,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(credential.provider.to_string())
    .bind(credential.public_key)
    .bind(credential.secret_key.into_inner())
    .bind(credential.is_active)
    .bind(credential.environment.to_string())
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🔑️ Payment setting inserted with id {}", credential.id);
    Ok(credential)
}

/// Applies the set fields of `update` and stamps `updated_at`. Returns `None` if there is no such record.
pub async fn update_credential(
    id: i64,
    update: CredentialUpdate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentCredential>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE payment_settings SET updated_at = ");
    builder.push_bind(now);
    if let Some(provider) = update.provider {
        builder.push(", provider = ");
        builder.push_bind(provider.to_string());
    }
    if let Some(public_key) = update.public_key {
        builder.push(", public_key = ");
        builder.push_bind(public_key);
    }
    if let Some(secret_key) = update.secret_key {
        builder.push(", secret_key = ");
        builder.push_bind(secret_key.into_inner());
    }
    if let Some(is_active) = update.is_active {
        builder.push(", is_active = ");
        builder.push_bind(is_active);
    }
    if let Some(environment) = update.environment {
        builder.push(", environment = ");
        builder.push_bind(environment.to_string());
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *;");
    trace!("🔑️ Executing query: {}", builder.sql());
    let res = builder
        .build()
        .fetch_optional(conn)
        .await?
        .map(|row: SqliteRow| PaymentCredential::from_row(&row))
        .transpose()?;
    Ok(res)
}

/// Removes the record, returning it as it was. Returns `None` if there is no such record.
pub async fn delete_credential(id: i64, conn: &mut SqliteConnection) -> Result<Option<PaymentCredential>, sqlx::Error> {
    let credential =
        sqlx::query_as("DELETE FROM payment_settings WHERE id = $1 RETURNING *;").bind(id).fetch_optional(conn).await?;
    Ok(credential)
}
