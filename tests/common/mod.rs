#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use menucatalog_rs::{
    handlers::{create_app, create_metrics_router},
    models::{
        CatalogRow, DrinkEntry, DrinkPatch, MealField, MealPatch, MenuEntry, NewDrinkEntry,
        NewMenuEntry, RepositoryError, RepositoryResult,
    },
    repositories::{DrinkRepository, MealRepository},
    Metrics, MenuCatalogStore,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

/// In-memory stand-in for one remote table. Ids are assigned sequentially
/// from "1", and any operation can be switched to fail.
pub struct InMemoryTable<T> {
    rows: Mutex<Vec<T>>,
    next_id: AtomicU64,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl<T: CatalogRow> InMemoryTable<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_rows(rows: Vec<T>) -> Arc<Self> {
        let table = Self::new();
        table.next_id.store(rows.len() as u64 + 1, Ordering::SeqCst);
        *table.rows.lock().unwrap() = rows;
        table
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    fn begin(&self, operation: &'static str) -> RepositoryResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(operation) {
            return Err(RepositoryError::ConnectionFailed);
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn modify(&self, id: &str, update: impl FnOnce(&mut T)) -> RepositoryResult<T> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(RepositoryError::NotFound)?;
        update(row);
        Ok(row.clone())
    }

    fn remove(&self, id: &str) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn push(&self, row: T) -> T {
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl MealRepository for InMemoryTable<MenuEntry> {
    async fn find_all(&self) -> RepositoryResult<Vec<MenuEntry>> {
        self.begin("select_all")?;
        Ok(self.rows())
    }

    async fn insert(&self, entry: NewMenuEntry) -> RepositoryResult<MenuEntry> {
        self.begin("insert")?;
        Ok(self.push(MenuEntry::with_id(self.next_id(), entry)))
    }

    async fn update(&self, id: &str, patch: MealPatch) -> RepositoryResult<MenuEntry> {
        self.begin("update")?;
        self.modify(id, |row| row.apply(&patch))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.begin("delete")?;
        self.remove(id)
    }
}

#[async_trait]
impl DrinkRepository for InMemoryTable<DrinkEntry> {
    async fn find_all(&self) -> RepositoryResult<Vec<DrinkEntry>> {
        self.begin("select_all")?;
        Ok(self.rows())
    }

    async fn insert(&self, entry: NewDrinkEntry) -> RepositoryResult<DrinkEntry> {
        self.begin("insert")?;
        Ok(self.push(DrinkEntry::with_id(self.next_id(), entry)))
    }

    async fn update(&self, id: &str, patch: DrinkPatch) -> RepositoryResult<DrinkEntry> {
        self.begin("update")?;
        self.modify(id, |row| row.apply(&patch))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.begin("delete")?;
        self.remove(id)
    }
}

pub struct TestEnvironment {
    pub meals: Arc<InMemoryTable<MenuEntry>>,
    pub drinks: Arc<InMemoryTable<DrinkEntry>>,
    pub store: Arc<MenuCatalogStore>,
    pub metrics: Arc<Metrics>,
    pub app: Router,
    pub metrics_app: Router,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_rows(Vec::new(), Vec::new())
    }

    pub fn with_rows(meals: Vec<MenuEntry>, drinks: Vec<DrinkEntry>) -> Self {
        let meals = InMemoryTable::with_rows(meals);
        let drinks = InMemoryTable::with_rows(drinks);
        let metrics = Arc::new(Metrics::new().unwrap());
        let store = Arc::new(MenuCatalogStore::new_with_metrics(
            meals.clone(),
            drinks.clone(),
            metrics.clone(),
        ));
        let app = create_app(store.clone(), metrics.clone());
        let metrics_app = create_metrics_router(store.clone(), metrics.clone());

        Self {
            meals,
            drinks,
            store,
            metrics,
            app,
            metrics_app,
        }
    }

    /// Another store over the same tables, as a second terminal would have
    pub fn second_store(&self) -> MenuCatalogStore {
        MenuCatalogStore::new(self.meals.clone(), self.drinks.clone())
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = call(&self.app, request).await;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    /// GET /metrics on the scrape router
    pub async fn scrape(&self) -> (StatusCode, String) {
        let request = Request::get("/metrics").body(Body::empty()).unwrap();
        let (status, bytes) = call(&self.metrics_app, request).await;
        (status, String::from_utf8(bytes).unwrap())
    }
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

pub fn meal(id: &str, name: &str, category: &str) -> MenuEntry {
    MenuEntry {
        id: id.to_string(),
        item_name: name.to_string(),
        description: format!("{} description", name),
        price: dec!(8.00),
        category: category.to_string(),
    }
}

pub fn drink(id: &str, name: &str, category: &str) -> DrinkEntry {
    DrinkEntry {
        id: id.to_string(),
        name: name.to_string(),
        price: dec!(3.50),
        category: category.to_string(),
    }
}

pub async fn fill_burger_draft(store: &MenuCatalogStore) {
    store.set_meal_draft(MealField::ItemName, "Burger").await;
    store.set_meal_draft(MealField::Description, "Beef burger").await;
    store.set_meal_draft(MealField::Price, "9.50").await;
    store.set_meal_draft(MealField::Category, "Mains").await;
}

pub fn ids<T: CatalogRow>(rows: &[T]) -> Vec<String> {
    rows.iter().map(|row| row.id().to_string()).collect()
}
