use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{prelude::*, users};
use crate::repositories::to_store_error;
use game_core::{StoreError, UserStateStore};
use game_types::UserProfile;

/// Profiles and the per-user `last_played` marker.
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_profile(model: users::Model) -> UserProfile {
        UserProfile {
            uid: model.uid,
            email: model.email,
            is_admin: model.is_admin,
            last_played: model.last_played,
            created_at: model.created_at,
        }
    }

    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<UserProfile>> {
        let user_model = Users::find_by_id(uid.to_string()).one(&self.db).await?;
        Ok(user_model.map(Self::model_to_profile))
    }

    /// Return the profile, creating a non-admin one on first touch.
    pub async fn ensure_profile(&self, uid: &str, email: &str) -> Result<UserProfile> {
        Self::insert_if_missing(&self.db, uid, email).await?;

        self.find_by_uid(uid)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve profile for {}", uid))
    }

    /// Unknown users are not admins.
    pub async fn is_admin(&self, uid: &str) -> Result<bool> {
        Ok(self
            .find_by_uid(uid)
            .await?
            .map(|profile| profile.is_admin)
            .unwrap_or(false))
    }

    pub async fn set_admin(&self, uid: &str, is_admin: bool) -> Result<()> {
        let result = Users::update_many()
            .col_expr(users::Column::IsAdmin, Expr::value(is_admin))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Uid.eq(uid))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found: {}", uid));
        }
        Ok(())
    }

    pub async fn last_played(&self, uid: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .find_by_uid(uid)
            .await?
            .and_then(|profile| profile.last_played))
    }

    pub async fn set_last_played(&self, uid: &str, email: &str, played_at: DateTime<Utc>) -> Result<()> {
        Self::insert_if_missing(&self.db, uid, email).await?;

        Users::update_many()
            .col_expr(users::Column::LastPlayed, Expr::value(played_at))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Uid.eq(uid))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn compare_and_set_last_played(
        &self,
        uid: &str,
        email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool> {
        Self::compare_and_set_on(&self.db, uid, email, expected, played_at).await
    }

    pub(crate) async fn insert_if_missing<C: ConnectionTrait>(db: &C, uid: &str, email: &str) -> Result<()> {
        let now = Utc::now();
        let user_model = users::ActiveModel {
            uid: ActiveValue::Set(uid.to_string()),
            email: ActiveValue::Set(email.to_string()),
            is_admin: ActiveValue::Set(false),
            last_played: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let inserted = Users::insert(user_model)
            .on_conflict(
                OnConflict::column(users::Column::Uid)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        if inserted > 0 {
            tracing::info!("Created profile for user {}", uid);
        }
        Ok(())
    }

    /// Single conditional UPDATE, so concurrent writers cannot both succeed.
    pub(crate) async fn compare_and_set_on<C: ConnectionTrait>(
        db: &C,
        uid: &str,
        email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool> {
        Self::insert_if_missing(db, uid, email).await?;

        let update = Users::update_many()
            .col_expr(users::Column::LastPlayed, Expr::value(played_at))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Uid.eq(uid));

        let update = match expected {
            Some(expected) => update.filter(users::Column::LastPlayed.eq(expected)),
            None => update.filter(users::Column::LastPlayed.is_null()),
        };

        let result = update.exec(db).await?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl UserStateStore for UserRepository {
    async fn read(&self, uid: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.last_played(uid).await.map_err(to_store_error)
    }

    async fn write(&self, uid: &str, email: &str, played_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.set_last_played(uid, email, played_at)
            .await
            .map_err(to_store_error)
    }

    async fn compare_and_set(
        &self,
        uid: &str,
        email: &str,
        expected: Option<DateTime<Utc>>,
        played_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.compare_and_set_last_played(uid, email, expected, played_at)
            .await
            .map_err(to_store_error)
    }
}
