//! Notification store.
//!
//! Rows are owned by a profile; owners list, mark-read and delete their
//! own rows, admins broadcast and delete anyone's. The push transport of
//! the hosted platform is out of scope; this is the durable side only.

use medmatch_core::{Error, Result};
use sea_query::{Alias, Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::onboarding::{get_int, get_text, get_text_opt};
use crate::store::{MatchStore, now_rfc3339};

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	pub id: String,
	pub user_id: String,
	pub title: String,
	pub message: String,
	pub kind: String,
	pub is_read: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub read_at: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
	pub created_at: String,
}

/// Payload for inserting a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
	pub title: String,
	pub message: String,
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
}

impl MatchStore {
	/// Inserts a notification for one user and returns the stored row.
	pub async fn add_notification(
		&self,
		user_id: &str,
		new: &NewNotification,
	) -> Result<Notification> {
		let notification = Notification {
			id: Uuid::new_v4().to_string(),
			user_id: user_id.to_string(),
			title: new.title.clone(),
			message: new.message.clone(),
			kind: new.kind.clone(),
			is_read: false,
			read_at: None,
			link: new.link.clone(),
			created_at: now_rfc3339(),
		};
		let sql = Query::insert()
			.into_table(Alias::new("notifications"))
			.columns([
				Alias::new("id"),
				Alias::new("user_id"),
				Alias::new("title"),
				Alias::new("message"),
				Alias::new("kind"),
				Alias::new("is_read"),
				Alias::new("link"),
				Alias::new("created_at"),
			])
			.values([
				Expr::val(notification.id.clone()),
				Expr::val(notification.user_id.clone()),
				Expr::val(notification.title.clone()),
				Expr::val(notification.message.clone()),
				Expr::val(notification.kind.clone()),
				Expr::val(0),
				notification
					.link
					.as_deref()
					.map(Expr::val)
					.unwrap_or(Expr::val(Option::<String>::None)),
				Expr::val(notification.created_at.clone()),
			])
			.map_err(|e| Error::database("notifications", e))?
			.to_string(SqliteQueryBuilder);
		self.exec(&sql, "notifications").await?;
		Ok(notification)
	}

	/// Lists a user's notifications, unread first, newest first.
	pub async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>> {
		let sql = Query::select()
			.columns([
				Alias::new("id"),
				Alias::new("user_id"),
				Alias::new("title"),
				Alias::new("message"),
				Alias::new("kind"),
				Alias::new("is_read"),
				Alias::new("read_at"),
				Alias::new("link"),
				Alias::new("created_at"),
			])
			.from(Alias::new("notifications"))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.order_by(Alias::new("is_read"), Order::Asc)
			.order_by(Alias::new("created_at"), Order::Desc)
			.to_string(SqliteQueryBuilder);
		let rows = self.fetch_all(&sql, "notifications").await?;
		rows.into_iter()
			.map(|row| {
				Ok(Notification {
					id: get_text(&row, "id")?,
					user_id: get_text(&row, "user_id")?,
					title: get_text(&row, "title")?,
					message: get_text(&row, "message")?,
					kind: get_text(&row, "kind")?,
					is_read: get_int(&row, "is_read")? != 0,
					read_at: get_text_opt(&row, "read_at")?,
					link: get_text_opt(&row, "link")?,
					created_at: get_text(&row, "created_at")?,
				})
			})
			.collect()
	}

	/// Marks one of the user's notifications as read.
	///
	/// Returns [`Error::NotFound`] when the row does not exist or belongs
	/// to someone else.
	pub async fn mark_notification_read(&self, user_id: &str, id: &str) -> Result<()> {
		let sql = Query::update()
			.table(Alias::new("notifications"))
			.value(Alias::new("is_read"), Expr::val(1))
			.value(Alias::new("read_at"), Expr::val(now_rfc3339()))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.to_string(SqliteQueryBuilder);
		let result = self.exec(&sql, "notifications").await?;
		if result.rows_affected() == 0 {
			return Err(Error::NotFound(format!("notification {}", id)));
		}
		Ok(())
	}

	/// Marks all of the user's notifications as read; returns how many
	/// rows changed.
	pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64> {
		let sql = Query::update()
			.table(Alias::new("notifications"))
			.value(Alias::new("is_read"), Expr::val(1))
			.value(Alias::new("read_at"), Expr::val(now_rfc3339()))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.and_where(Expr::col(Alias::new("is_read")).eq(0))
			.to_string(SqliteQueryBuilder);
		Ok(self.exec(&sql, "notifications").await?.rows_affected())
	}

	/// Deletes a notification. With `owner` set the delete is scoped to
	/// that user's rows; admins pass `None`.
	pub async fn delete_notification(&self, id: &str, owner: Option<&str>) -> Result<()> {
		// Statement values are not Send; render the SQL before awaiting.
		let sql = {
			let mut delete = Query::delete();
			delete
				.from_table(Alias::new("notifications"))
				.and_where(Expr::col(Alias::new("id")).eq(id));
			if let Some(user_id) = owner {
				delete.and_where(Expr::col(Alias::new("user_id")).eq(user_id));
			}
			delete.to_string(SqliteQueryBuilder)
		};
		let result = self.exec(&sql, "notifications").await?;
		if result.rows_affected() == 0 {
			return Err(Error::NotFound(format!("notification {}", id)));
		}
		Ok(())
	}

	/// Unread notification count across all users (dashboard stat).
	pub async fn count_unread_notifications(&self) -> Result<i64> {
		let sql = "SELECT COUNT(*) AS cnt FROM notifications WHERE is_read = 0";
		let row = self
			.fetch_optional(sql, "notifications")
			.await?
			.ok_or_else(|| Error::Database("count query returned no row".to_string()))?;
		get_int(&row, "cnt")
	}
}
