use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{entities::users::UserEntity, repositories::users::UserRepository},
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_username(&self, username: String) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let row = users::table
                .filter(users::username.eq(username))
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }
}
