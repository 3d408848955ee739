use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Game,
};

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create(&self, game: Game) -> AppResult<Game>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Game>>;
    /// Sets `time_ended` once; ending an ended game returns it unchanged.
    async fn mark_ended(&self, id: &str, ended_at: DateTime<Utc>) -> AppResult<Game>;
}

pub struct MongoGameRepository {
    collection: Collection<Game>,
}

impl MongoGameRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(db.games_collection());
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for games collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        log::info!("Successfully created indexes for games collection");
        Ok(())
    }
}

#[async_trait]
impl GameRepository for MongoGameRepository {
    async fn create(&self, game: Game) -> AppResult<Game> {
        self.collection.insert_one(&game).await?;
        Ok(game)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Game>> {
        let game = self.collection.find_one(doc! { "id": id }).await?;
        Ok(game)
    }

    async fn mark_ended(&self, id: &str, ended_at: DateTime<Utc>) -> AppResult<Game> {
        let ended_at = to_bson(&ended_at).map_err(|e| AppError::InternalError(e.to_string()))?;

        // only the first writer matches an open game
        self.collection
            .update_one(
                doc! { "id": id, "time_ended": null },
                doc! { "$set": { "time_ended": ended_at } },
            )
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game with id '{}' not found", id)))
    }
}
