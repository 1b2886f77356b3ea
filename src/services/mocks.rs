use async_trait::async_trait;
use mockall::mock;
use tokio::sync::Notify;

use crate::models::{
    DrinkEntry, DrinkPatch, MealPatch, MenuEntry, NewDrinkEntry, NewMenuEntry, Notification,
    RepositoryError,
};
use crate::repositories::{DrinkRepository, MealRepository};
use crate::services::Notifier;

mock! {
    pub TestMealRepository {}

    #[async_trait]
    impl MealRepository for TestMealRepository {
        async fn find_all(&self) -> Result<Vec<MenuEntry>, RepositoryError>;
        async fn insert(&self, entry: NewMenuEntry) -> Result<MenuEntry, RepositoryError>;
        async fn update(&self, id: &str, patch: MealPatch) -> Result<MenuEntry, RepositoryError>;
        async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    }
}

mock! {
    pub TestDrinkRepository {}

    #[async_trait]
    impl DrinkRepository for TestDrinkRepository {
        async fn find_all(&self) -> Result<Vec<DrinkEntry>, RepositoryError>;
        async fn insert(&self, entry: NewDrinkEntry) -> Result<DrinkEntry, RepositoryError>;
        async fn update(&self, id: &str, patch: DrinkPatch) -> Result<DrinkEntry, RepositoryError>;
        async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    }
}

mock! {
    pub TestNotifier {}

    #[async_trait]
    impl Notifier for TestNotifier {
        async fn notify(&self, notification: Notification);
        async fn confirm(&self, prompt: &str) -> bool;
    }
}

/// A table whose `find_all` parks until released, so a test can look at the
/// store while a load is in flight
pub struct GatedTable<T> {
    rows: Vec<T>,
    pub entered: Notify,
    pub release: Notify,
}

impl<T> GatedTable<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

impl<T: Clone> GatedTable<T> {
    async fn select_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.rows.clone())
    }
}

#[async_trait]
impl MealRepository for GatedTable<MenuEntry> {
    async fn find_all(&self) -> Result<Vec<MenuEntry>, RepositoryError> {
        self.select_all().await
    }

    async fn insert(&self, _entry: NewMenuEntry) -> Result<MenuEntry, RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }

    async fn update(&self, _id: &str, _patch: MealPatch) -> Result<MenuEntry, RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }

    async fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }
}

#[async_trait]
impl DrinkRepository for GatedTable<DrinkEntry> {
    async fn find_all(&self) -> Result<Vec<DrinkEntry>, RepositoryError> {
        self.select_all().await
    }

    async fn insert(&self, _entry: NewDrinkEntry) -> Result<DrinkEntry, RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }

    async fn update(&self, _id: &str, _patch: DrinkPatch) -> Result<DrinkEntry, RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }

    async fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::ConnectionFailed)
    }
}
