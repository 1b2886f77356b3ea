use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::models::{
    CatalogFilter, Collection, DrinkDraft, DrinkEntry, DrinkField, DrinkPatch, EditField,
    EditRow, EditSession, EntryKind, MealDraft, MealField, MealPatch, MenuEntry, NewDrinkEntry,
    NewMenuEntry, RepositoryResult, ServiceResult, StoreError,
};
use crate::observability::{Metrics, RemoteCallTracer};
use crate::repositories::{DrinkRepository, MealRepository};

/// Everything the view layer renders: both collections with their filtered
/// views and loading flags, the add-form drafts and the active edit session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub meals: Collection<MenuEntry>,
    pub drinks: Collection<DrinkEntry>,
    pub meal_draft: MealDraft,
    pub drink_draft: DrinkDraft,
    pub edit: Option<EditSession>,
}

/// Local mirror of the `menuItems` and `drinks` tables.
///
/// Each operation validates locally, calls the remote table, then applies its
/// outcome to the mirrored collections in a single write. The state lock is
/// never held across a remote call, so two operations in flight each apply
/// their own result when it arrives; nothing is versioned and the last
/// successful save of an entry wins.
pub struct MenuCatalogStore {
    meals_repo: Arc<dyn MealRepository>,
    drinks_repo: Arc<dyn DrinkRepository>,
    tracer: Option<RemoteCallTracer>,
    state: RwLock<CatalogSnapshot>,
}

impl MenuCatalogStore {
    pub fn new(meals_repo: Arc<dyn MealRepository>, drinks_repo: Arc<dyn DrinkRepository>) -> Self {
        Self {
            meals_repo,
            drinks_repo,
            tracer: None,
            state: RwLock::new(CatalogSnapshot::default()),
        }
    }

    /// Create a store that records remote call and catalog metrics
    pub fn new_with_metrics(
        meals_repo: Arc<dyn MealRepository>,
        drinks_repo: Arc<dyn DrinkRepository>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            tracer: Some(RemoteCallTracer::new(metrics)),
            ..Self::new(meals_repo, drinks_repo)
        }
    }

    async fn remote<T, F>(&self, operation: &str, kind: EntryKind, call: F) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        match &self.tracer {
            Some(tracer) => tracer.trace_operation(operation, kind.table(), call).await,
            None => call.await,
        }
    }

    fn record(&self, operation: &str, success: bool) {
        if let Some(tracer) = &self.tracer {
            tracer.record_catalog_operation(operation, success);
        }
    }

    fn record_entries(&self, kind: EntryKind, count: usize) {
        if let Some(tracer) = &self.tracer {
            tracer.set_catalog_entries(kind.table(), count);
        }
    }

    /// Fetch every meal, replacing the cached rows. Returns the row count.
    #[instrument(skip(self))]
    pub async fn load_meals(&self) -> ServiceResult<usize> {
        crate::info_with_trace!("Loading meals");
        self.state.write().await.meals.set_loading(true);

        let result = self
            .remote("select_all", EntryKind::Meal, self.meals_repo.find_all())
            .await;

        let mut state = self.state.write().await;
        state.meals.set_loading(false);

        match result {
            Ok(rows) => {
                state.meals.replace_all(rows);
                let count = state.meals.len();
                drop(state);

                self.record("load_meals", true);
                self.record_entries(EntryKind::Meal, count);
                crate::info_with_trace!("Loaded {} meals", count);
                Ok(count)
            }
            Err(source) => {
                drop(state);
                self.record("load_meals", false);
                crate::warn_with_trace!(
                    error = %source,
                    "Failed to load meals, keeping cached rows"
                );
                Err(StoreError::Fetch {
                    kind: EntryKind::Meal,
                    source,
                })
            }
        }
    }

    /// Fetch every drink, replacing the cached rows. Returns the row count.
    #[instrument(skip(self))]
    pub async fn load_drinks(&self) -> ServiceResult<usize> {
        crate::info_with_trace!("Loading drinks");
        self.state.write().await.drinks.set_loading(true);

        let result = self
            .remote("select_all", EntryKind::Drink, self.drinks_repo.find_all())
            .await;

        let mut state = self.state.write().await;
        state.drinks.set_loading(false);

        match result {
            Ok(rows) => {
                state.drinks.replace_all(rows);
                let count = state.drinks.len();
                drop(state);

                self.record("load_drinks", true);
                self.record_entries(EntryKind::Drink, count);
                crate::info_with_trace!("Loaded {} drinks", count);
                Ok(count)
            }
            Err(source) => {
                drop(state);
                self.record("load_drinks", false);
                crate::warn_with_trace!(
                    error = %source,
                    "Failed to load drinks, keeping cached rows"
                );
                Err(StoreError::Fetch {
                    kind: EntryKind::Drink,
                    source,
                })
            }
        }
    }

    /// Insert the meal draft. The draft is cleared only once the row is stored.
    #[instrument(skip(self))]
    pub async fn add_meal(&self) -> ServiceResult<MenuEntry> {
        let draft = self.state.read().await.meal_draft.clone();

        let request = NewMenuEntry::try_from(&draft).map_err(|e| {
            self.record("add_meal", false);
            crate::warn_with_trace!(error = %e, "Meal draft rejected");
            StoreError::from(e)
        })?;

        let result = self
            .remote("insert", EntryKind::Meal, self.meals_repo.insert(request))
            .await;

        match result {
            Ok(entry) => {
                let count = {
                    let mut state = self.state.write().await;
                    state.meals.append(entry.clone());
                    state.meal_draft.clear();
                    state.meals.len()
                };

                self.record("add_meal", true);
                self.record_entries(EntryKind::Meal, count);
                crate::info_with_trace!(id = %entry.id, "Meal added");
                Ok(entry)
            }
            Err(source) => {
                self.record("add_meal", false);
                crate::error_with_trace!(error = %source, "Failed to add meal");
                Err(StoreError::Insert {
                    kind: EntryKind::Meal,
                    source,
                })
            }
        }
    }

    /// Insert the drink draft. The draft is cleared only once the row is stored.
    #[instrument(skip(self))]
    pub async fn add_drink(&self) -> ServiceResult<DrinkEntry> {
        let draft = self.state.read().await.drink_draft.clone();

        let request = NewDrinkEntry::try_from(&draft).map_err(|e| {
            self.record("add_drink", false);
            crate::warn_with_trace!(error = %e, "Drink draft rejected");
            StoreError::from(e)
        })?;

        let result = self
            .remote("insert", EntryKind::Drink, self.drinks_repo.insert(request))
            .await;

        match result {
            Ok(entry) => {
                let count = {
                    let mut state = self.state.write().await;
                    state.drinks.append(entry.clone());
                    state.drink_draft.clear();
                    state.drinks.len()
                };

                self.record("add_drink", true);
                self.record_entries(EntryKind::Drink, count);
                crate::info_with_trace!(id = %entry.id, "Drink added");
                Ok(entry)
            }
            Err(source) => {
                self.record("add_drink", false);
                crate::error_with_trace!(error = %source, "Failed to add drink");
                Err(StoreError::Insert {
                    kind: EntryKind::Drink,
                    source,
                })
            }
        }
    }

    /// Open an edit session on `id`, discarding any session already open
    #[instrument(skip(self, row))]
    pub async fn begin_edit(&self, id: &str, row: EditRow) {
        let session = EditSession::open(id, &row);
        let previous = self.state.write().await.edit.replace(session);

        if let Some(previous) = previous {
            tracing::debug!(discarded = %previous.id(), "Replaced open edit session");
        }
        crate::info_with_trace!(kind = %row_kind(&row), "Edit session opened");
    }

    pub async fn begin_meal_edit(&self, entry: &MenuEntry) {
        self.begin_edit(&entry.id, EditRow::Meal(entry.clone())).await
    }

    pub async fn begin_drink_edit(&self, entry: &DrinkEntry) {
        self.begin_edit(&entry.id, EditRow::Drink(entry.clone())).await
    }

    /// Open an edit session on a cached row
    #[instrument(skip(self))]
    pub async fn begin_edit_by_id(&self, kind: EntryKind, id: &str) -> ServiceResult<()> {
        let row = {
            let state = self.state.read().await;
            match kind {
                EntryKind::Meal => state.meals.get(id).cloned().map(EditRow::Meal),
                EntryKind::Drink => state.drinks.get(id).cloned().map(EditRow::Drink),
            }
        };

        match row {
            Some(row) => {
                self.begin_edit(id, row).await;
                Ok(())
            }
            None => {
                crate::warn_with_trace!("No cached row to edit");
                Err(StoreError::EntryNotFound {
                    kind,
                    id: id.to_string(),
                })
            }
        }
    }

    /// Write one field of the active edit draft. Returns false when there is
    /// no session or the field belongs to the other entry kind.
    pub async fn update_edit_field(&self, field: EditField, value: impl Into<String>) -> bool {
        match self.state.write().await.edit.as_mut() {
            Some(session) => session.set_field(field, value),
            None => false,
        }
    }

    /// Close the edit session without saving. Returns whether one was open.
    pub async fn cancel_edit(&self) -> bool {
        self.state.write().await.edit.take().is_some()
    }

    pub async fn edit_session(&self) -> Option<EditSession> {
        self.state.read().await.edit.clone()
    }

    /// Send the edit draft for meal `id`. On failure the session stays open
    /// with its draft so the save can be retried.
    #[instrument(skip(self))]
    pub async fn save_meal(&self, id: &str) -> ServiceResult<MenuEntry> {
        let draft = match self.state.read().await.edit.as_ref() {
            Some(EditSession::Meal { id: open_id, draft }) if open_id == id => draft.clone(),
            _ => {
                self.record("save_meal", false);
                return Err(StoreError::NoActiveEdit {
                    kind: EntryKind::Meal,
                    id: id.to_string(),
                });
            }
        };

        let patch = MealPatch::try_from(&draft).map_err(|e| {
            self.record("save_meal", false);
            StoreError::from(e)
        })?;

        let result = self
            .remote(
                "update",
                EntryKind::Meal,
                self.meals_repo.update(id, patch.clone()),
            )
            .await;

        match result {
            Ok(stored) => {
                {
                    let mut state = self.state.write().await;
                    state.meals.merge(id, |entry| entry.apply(&patch));
                    if state
                        .edit
                        .as_ref()
                        .is_some_and(|session| session.targets(EntryKind::Meal, id))
                    {
                        state.edit = None;
                    }
                }

                self.record("save_meal", true);
                crate::info_with_trace!("Meal updated");
                Ok(stored)
            }
            Err(source) => {
                self.record("save_meal", false);
                crate::error_with_trace!(
                    error = %source,
                    "Failed to update meal, edit session kept"
                );
                Err(StoreError::Update {
                    kind: EntryKind::Meal,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Send the edit draft for drink `id`. On failure the session stays open
    /// with its draft so the save can be retried.
    #[instrument(skip(self))]
    pub async fn save_drink(&self, id: &str) -> ServiceResult<DrinkEntry> {
        let draft = match self.state.read().await.edit.as_ref() {
            Some(EditSession::Drink { id: open_id, draft }) if open_id == id => draft.clone(),
            _ => {
                self.record("save_drink", false);
                return Err(StoreError::NoActiveEdit {
                    kind: EntryKind::Drink,
                    id: id.to_string(),
                });
            }
        };

        let patch = DrinkPatch::try_from(&draft).map_err(|e| {
            self.record("save_drink", false);
            StoreError::from(e)
        })?;

        let result = self
            .remote(
                "update",
                EntryKind::Drink,
                self.drinks_repo.update(id, patch.clone()),
            )
            .await;

        match result {
            Ok(stored) => {
                {
                    let mut state = self.state.write().await;
                    state.drinks.merge(id, |entry| entry.apply(&patch));
                    if state
                        .edit
                        .as_ref()
                        .is_some_and(|session| session.targets(EntryKind::Drink, id))
                    {
                        state.edit = None;
                    }
                }

                self.record("save_drink", true);
                crate::info_with_trace!("Drink updated");
                Ok(stored)
            }
            Err(source) => {
                self.record("save_drink", false);
                crate::error_with_trace!(
                    error = %source,
                    "Failed to update drink, edit session kept"
                );
                Err(StoreError::Update {
                    kind: EntryKind::Drink,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Delete meal `id` from the remote table, then from both views
    #[instrument(skip(self))]
    pub async fn delete_meal(&self, id: &str) -> ServiceResult<()> {
        let result = self
            .remote("delete", EntryKind::Meal, self.meals_repo.delete(id))
            .await;

        match result {
            Ok(()) => {
                let count = {
                    let mut state = self.state.write().await;
                    state.meals.remove(id);
                    if state
                        .edit
                        .as_ref()
                        .is_some_and(|session| session.targets(EntryKind::Meal, id))
                    {
                        state.edit = None;
                    }
                    state.meals.len()
                };

                self.record("delete_meal", true);
                self.record_entries(EntryKind::Meal, count);
                crate::info_with_trace!("Meal deleted");
                Ok(())
            }
            Err(source) => {
                self.record("delete_meal", false);
                crate::error_with_trace!(error = %source, "Failed to delete meal");
                Err(StoreError::Delete {
                    kind: EntryKind::Meal,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Delete drink `id` from the remote table, then from both views
    #[instrument(skip(self))]
    pub async fn delete_drink(&self, id: &str) -> ServiceResult<()> {
        let result = self
            .remote("delete", EntryKind::Drink, self.drinks_repo.delete(id))
            .await;

        match result {
            Ok(()) => {
                let count = {
                    let mut state = self.state.write().await;
                    state.drinks.remove(id);
                    if state
                        .edit
                        .as_ref()
                        .is_some_and(|session| session.targets(EntryKind::Drink, id))
                    {
                        state.edit = None;
                    }
                    state.drinks.len()
                };

                self.record("delete_drink", true);
                self.record_entries(EntryKind::Drink, count);
                crate::info_with_trace!("Drink deleted");
                Ok(())
            }
            Err(source) => {
                self.record("delete_drink", false);
                crate::error_with_trace!(error = %source, "Failed to delete drink");
                Err(StoreError::Delete {
                    kind: EntryKind::Drink,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    pub async fn set_meal_draft(&self, field: MealField, value: impl Into<String>) {
        self.state.write().await.meal_draft.set(field, value);
    }

    pub async fn set_drink_draft(&self, field: DrinkField, value: impl Into<String>) {
        self.state.write().await.drink_draft.set(field, value);
    }

    pub async fn meal_draft(&self) -> MealDraft {
        self.state.read().await.meal_draft.clone()
    }

    pub async fn drink_draft(&self) -> DrinkDraft {
        self.state.read().await.drink_draft.clone()
    }

    /// Filter the meal view. Returns the number of visible meals.
    #[instrument(skip(self))]
    pub async fn apply_meal_filter(&self, filter: CatalogFilter) -> usize {
        let mut state = self.state.write().await;
        state.meals.apply_filter(filter);
        state.meals.filtered().len()
    }

    /// Filter the drink view. Returns the number of visible drinks.
    #[instrument(skip(self))]
    pub async fn apply_drink_filter(&self, filter: CatalogFilter) -> usize {
        let mut state = self.state.write().await;
        state.drinks.apply_filter(filter);
        state.drinks.filtered().len()
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.clone()
    }

    /// Cached (meals, drinks) row counts
    pub async fn entry_counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.meals.items().len(), state.drinks.items().len())
    }
}

fn row_kind(row: &EditRow) -> EntryKind {
    match row {
        EditRow::Meal(_) => EntryKind::Meal,
        EditRow::Drink(_) => EntryKind::Drink,
    }
}
