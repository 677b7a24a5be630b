//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::message::{ChatMessage, MessageBody};
use crate::domain::ports::{MessageCursorKey, MessageRepository, MessageRepositoryError};
use crate::domain::user::UserId;

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed implementation of the message mirror port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessageRepositoryError {
    map_basic_pool_error(error, MessageRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_basic_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

fn row_to_message(row: &MessageRow) -> Result<ChatMessage, MessageRepositoryError> {
    let body = MessageBody::new(row.body.as_str())
        .map_err(|err| MessageRepositoryError::query(err.to_string()))?;
    Ok(ChatMessage {
        id: row.id,
        sender_id: UserId::from_uuid(row.sender_id),
        receiver_id: UserId::from_uuid(row.receiver_id),
        body,
        sent_at: row.sent_at,
    })
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn save(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(messages::table)
            .values(&NewMessageRow {
                id: message.id,
                sender_id: *message.sender_id.as_uuid(),
                receiver_id: *message.receiver_id.as_uuid(),
                body: message.body.as_ref(),
                sent_at: message.sent_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_between(
        &self,
        a: &UserId,
        b: &UserId,
        before: Option<MessageCursorKey>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (a, b): (Uuid, Uuid) = (*a.as_uuid(), *b.as_uuid());

        let mut query = messages::table
            .filter(
                messages::sender_id
                    .eq(a)
                    .and(messages::receiver_id.eq(b))
                    .or(messages::sender_id.eq(b).and(messages::receiver_id.eq(a))),
            )
            .into_boxed();
        if let Some(key) = before {
            query = query.filter(
                messages::sent_at.lt(key.sent_at).or(messages::sent_at
                    .eq(key.sent_at)
                    .and(messages::id.lt(key.id))),
            );
        }

        let rows: Vec<MessageRow> = query
            .order((messages::sent_at.desc(), messages::id.desc()))
            .limit(limit)
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.iter().map(row_to_message).collect()
    }
}
