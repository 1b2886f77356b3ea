use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    CatalogFilter, DrinkEntry, DrinkField, EditField, EntryKind, MealField, MenuEntry,
    Notification, StoreError,
};
use crate::services::catalog_store::{CatalogSnapshot, MenuCatalogStore};

/// The view's alert and confirmation surface
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);

    /// Ask a yes/no question before a destructive action
    async fn confirm(&self, prompt: &str) -> bool;
}

/// View-facing wrapper around the catalog store.
///
/// Every outcome is reported through the notifier; no operation here returns
/// an error to its caller.
pub struct MenuDashboard {
    store: Arc<MenuCatalogStore>,
    notifier: Arc<dyn Notifier>,
}

impl MenuDashboard {
    pub fn new(store: Arc<MenuCatalogStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &MenuCatalogStore {
        &self.store
    }

    async fn report(&self, error: StoreError) {
        self.notifier.notify(Notification::from_error(&error)).await;
    }

    async fn settle<T>(
        &self,
        result: Result<T, StoreError>,
        success: Option<Notification>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                if let Some(notification) = success {
                    self.notifier.notify(notification).await;
                }
                Some(value)
            }
            Err(error) => {
                self.report(error).await;
                None
            }
        }
    }

    pub async fn load_meals(&self) -> Option<usize> {
        let result = self.store.load_meals().await;
        self.settle(result, None).await
    }

    pub async fn load_drinks(&self) -> Option<usize> {
        let result = self.store.load_drinks().await;
        self.settle(result, None).await
    }

    pub async fn add_meal(&self) -> Option<MenuEntry> {
        let result = self.store.add_meal().await;
        self.settle(result, Some(Notification::created(EntryKind::Meal)))
            .await
    }

    pub async fn add_drink(&self) -> Option<DrinkEntry> {
        let result = self.store.add_drink().await;
        self.settle(result, Some(Notification::created(EntryKind::Drink)))
            .await
    }

    pub async fn set_meal_draft(&self, field: MealField, value: impl Into<String>) {
        self.store.set_meal_draft(field, value).await
    }

    pub async fn set_drink_draft(&self, field: DrinkField, value: impl Into<String>) {
        self.store.set_drink_draft(field, value).await
    }

    pub async fn begin_meal_edit(&self, entry: &MenuEntry) {
        self.store.begin_meal_edit(entry).await
    }

    pub async fn begin_drink_edit(&self, entry: &DrinkEntry) {
        self.store.begin_drink_edit(entry).await
    }

    /// Open an edit session on a cached row. Returns whether one was opened.
    pub async fn begin_edit_by_id(&self, kind: EntryKind, id: &str) -> bool {
        let result = self.store.begin_edit_by_id(kind, id).await;
        self.settle(result, None).await.is_some()
    }

    pub async fn update_edit_field(&self, field: EditField, value: impl Into<String>) -> bool {
        self.store.update_edit_field(field, value).await
    }

    pub async fn cancel_edit(&self) -> bool {
        self.store.cancel_edit().await
    }

    pub async fn save_meal(&self, id: &str) -> Option<MenuEntry> {
        let result = self.store.save_meal(id).await;
        self.settle(result, Some(Notification::updated(EntryKind::Meal)))
            .await
    }

    pub async fn save_drink(&self, id: &str) -> Option<DrinkEntry> {
        let result = self.store.save_drink(id).await;
        self.settle(result, Some(Notification::updated(EntryKind::Drink)))
            .await
    }

    /// Delete meal `id` once the user confirms. Returns whether it was deleted.
    #[instrument(skip(self))]
    pub async fn delete_meal(&self, id: &str) -> bool {
        if !self.confirm_delete(EntryKind::Meal).await {
            return false;
        }
        let result = self.store.delete_meal(id).await;
        self.settle(result, Some(Notification::deleted(EntryKind::Meal)))
            .await
            .is_some()
    }

    /// Delete drink `id` once the user confirms. Returns whether it was deleted.
    #[instrument(skip(self))]
    pub async fn delete_drink(&self, id: &str) -> bool {
        if !self.confirm_delete(EntryKind::Drink).await {
            return false;
        }
        let result = self.store.delete_drink(id).await;
        self.settle(result, Some(Notification::deleted(EntryKind::Drink)))
            .await
            .is_some()
    }

    async fn confirm_delete(&self, kind: EntryKind) -> bool {
        let prompt = format!("Are you sure you want to delete this {}?", kind);
        let confirmed = self.notifier.confirm(&prompt).await;
        if !confirmed {
            crate::info_with_trace!(kind = %kind, "Delete declined");
        }
        confirmed
    }

    pub async fn apply_meal_filter(&self, filter: CatalogFilter) -> usize {
        self.store.apply_meal_filter(filter).await
    }

    pub async fn apply_drink_filter(&self, filter: CatalogFilter) -> usize {
        self.store.apply_drink_filter(filter).await
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.store.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, NotificationLevel, RepositoryError};
    use crate::services::mocks::{MockTestDrinkRepository, MockTestMealRepository, MockTestNotifier};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn dashboard(
        meals: MockTestMealRepository,
        drinks: MockTestDrinkRepository,
        notifier: MockTestNotifier,
    ) -> MenuDashboard {
        let store = MenuCatalogStore::new(Arc::new(meals), Arc::new(drinks));
        MenuDashboard::new(Arc::new(store), Arc::new(notifier))
    }

    fn cola() -> DrinkEntry {
        DrinkEntry {
            id: "1".to_string(),
            name: "Cola".to_string(),
            price: dec!(2.50),
            category: "Soft".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_meal_notifies_success() {
        let mut meals = MockTestMealRepository::new();
        meals
            .expect_insert()
            .times(1)
            .returning(|entry| Ok(MenuEntry::with_id("1", entry)));

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.kind == NotificationKind::Created && n.message == "Meal added successfully"
            })
            .times(1)
            .returning(|_| ());

        let dashboard = dashboard(meals, MockTestDrinkRepository::new(), notifier);
        dashboard.set_meal_draft(MealField::ItemName, "Burger").await;
        dashboard.set_meal_draft(MealField::Description, "Beef burger").await;
        dashboard.set_meal_draft(MealField::Price, "9.50").await;
        dashboard.set_meal_draft(MealField::Category, "Mains").await;

        let added = dashboard.add_meal().await.unwrap();
        assert_eq!(added.id, "1");
        assert_eq!(dashboard.snapshot().await.meals.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_becomes_error_notification() {
        let mut meals = MockTestMealRepository::new();
        meals.expect_insert().times(0);

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.level == NotificationLevel::Error && n.kind == NotificationKind::ValidationFailed
            })
            .times(1)
            .returning(|_| ());

        let dashboard = dashboard(meals, MockTestDrinkRepository::new(), notifier);
        assert!(dashboard.add_meal().await.is_none());
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_remote_call() {
        let mut drinks = MockTestDrinkRepository::new();
        drinks.expect_find_all().returning(|| Ok(vec![cola()]));
        drinks.expect_delete().times(0);

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_confirm()
            .with(eq("Are you sure you want to delete this drink?"))
            .times(1)
            .returning(|_| false);
        notifier.expect_notify().times(0);

        let dashboard = dashboard(MockTestMealRepository::new(), drinks, notifier);
        dashboard.load_drinks().await;

        assert!(!dashboard.delete_drink("1").await);
        assert_eq!(dashboard.snapshot().await.drinks.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_delete_failure_is_reported() {
        let mut drinks = MockTestDrinkRepository::new();
        drinks.expect_find_all().returning(|| Ok(vec![cola()]));
        drinks
            .expect_delete()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionFailed));

        let mut notifier = MockTestNotifier::new();
        notifier.expect_confirm().times(1).returning(|_| true);
        notifier
            .expect_notify()
            .withf(|n| {
                n.kind == NotificationKind::DeleteFailed
                    && n.message.starts_with("Error deleting drink")
            })
            .times(1)
            .returning(|_| ());

        let dashboard = dashboard(MockTestMealRepository::new(), drinks, notifier);
        dashboard.load_drinks().await;

        assert!(!dashboard.delete_drink("1").await);
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.drinks.items(), &[cola()]);
        assert_eq!(snapshot.drinks.filtered(), &[cola()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let mut meals = MockTestMealRepository::new();
        meals.expect_find_all().returning(|| {
            Err(RepositoryError::TableNotFound {
                table_name: "menuItems".to_string(),
            })
        });

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.kind == NotificationKind::FetchFailed)
            .times(1)
            .returning(|_| ());

        let dashboard = dashboard(meals, MockTestDrinkRepository::new(), notifier);
        assert!(dashboard.load_meals().await.is_none());
        assert!(!dashboard.snapshot().await.meals.is_loading());
    }

    #[tokio::test]
    async fn test_save_drink_notifies_and_closes_session() {
        let mut drinks = MockTestDrinkRepository::new();
        drinks.expect_find_all().returning(|| Ok(vec![cola()]));
        drinks.expect_update().times(1).returning(|id, patch| {
            let mut stored = cola();
            stored.id = id.to_string();
            stored.apply(&patch);
            Ok(stored)
        });

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.message == "Drink updated successfully")
            .times(1)
            .returning(|_| ());

        let dashboard = dashboard(MockTestMealRepository::new(), drinks, notifier);
        dashboard.load_drinks().await;
        assert!(dashboard.begin_edit_by_id(EntryKind::Drink, "1").await);
        assert!(
            dashboard
                .update_edit_field(DrinkField::Name.into(), "Diet Cola")
                .await
        );

        let saved = dashboard.save_drink("1").await.unwrap();
        assert_eq!(saved.name, "Diet Cola");

        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.edit.is_none());
        assert_eq!(snapshot.drinks.filtered()[0].name, "Diet Cola");
    }
}
