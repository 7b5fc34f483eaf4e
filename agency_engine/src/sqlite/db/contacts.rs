use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use crate::{
    admin_api::contact_objects::ContactQueryFilter,
    db_types::{ContactStatus, ContactSubmission, NewContactSubmission},
};

impl FromRow<'_, SqliteRow> for ContactSubmission {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            message: row.try_get("message")?,
            status: ContactStatus::from(status),
            created_at: row.try_get("created_at")?,
        })
    }
}

pub async fn fetch_contacts(
    query: ContactQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<ContactSubmission>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM contact_submissions ");
    if let Some(status) = query.status {
        builder.push("WHERE status = ");
        builder.push_bind(status.to_string());
    }
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(query.limit);
    trace!("📨️ Executing query: {}", builder.sql());
    let contacts = builder.build_query_as::<ContactSubmission>().fetch_all(conn).await?;
    Ok(contacts)
}

/// Appends a new submission. New submissions always start out as `pending`.
pub async fn insert_contact(
    contact: NewContactSubmission,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<ContactSubmission, sqlx::Error> {
    let contact = sqlx::query_as(
        r#"
            INSERT INTO contact_submissions (name, email, phone, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(contact.name)
    .bind(contact.email)
    .bind(contact.phone)
    .bind(contact.message)
    .bind(ContactStatus::Pending.to_string())
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(contact)
}

/// Sets the follow-up status of a submission. Returns `None` if the submission does not exist.
pub async fn update_contact_status(
    id: i64,
    status: ContactStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<ContactSubmission>, sqlx::Error> {
    let contact = sqlx::query_as("UPDATE contact_submissions SET status = $1 WHERE id = $2 RETURNING *;")
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(contact)
}
