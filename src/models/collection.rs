use serde::Serialize;

use super::{CatalogFilter, CatalogRow};

/// A base collection mirrored by its filtered view.
///
/// Every mutation goes through this type so the filtered view is re-derived
/// from the base collection in the same step. With a cleared filter the two
/// always hold the same rows in the same order.
#[derive(Debug, Clone, Serialize)]
pub struct Collection<T> {
    items: Vec<T>,
    filtered: Vec<T>,
    filter: CatalogFilter,
    loading: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            filter: CatalogFilter::default(),
            loading: false,
        }
    }
}

impl<T: CatalogRow> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace both base and filtered rows with a freshly fetched set
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    /// Append a newly inserted row to both views
    pub fn append(&mut self, item: T) {
        if item.matches(&self.filter) {
            self.filtered.push(item.clone());
        }
        self.items.push(item);
    }

    /// Apply `update` to the row with `id` in both views. Returns false if no
    /// such row is cached.
    pub fn merge<F>(&mut self, id: &str, update: F) -> bool
    where
        F: Fn(&mut T),
    {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        update(item);
        let still_visible = item.matches(&self.filter);
        let merged = item.clone();

        match self.filtered.iter().position(|item| item.id() == id) {
            Some(index) if still_visible => self.filtered[index] = merged,
            Some(index) => {
                self.filtered.remove(index);
            }
            // Row became visible through the edit; rebuild to keep base order
            None if still_visible => self.refilter(),
            None => {}
        }
        true
    }

    /// Remove the row with `id` from both views. Returns false if no such row
    /// is cached.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.filtered.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Change the active filter and re-derive the filtered view
    pub fn apply_filter(&mut self, filter: CatalogFilter) {
        self.filter = filter;
        self.refilter();
    }

    fn refilter(&mut self) {
        if self.filter.is_cleared() {
            self.filtered = self.items.clone();
        } else {
            self.filtered = self
                .items
                .iter()
                .filter(|item| item.matches(&self.filter))
                .cloned()
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuEntry, NewMenuEntry};
    use rust_decimal_macros::dec;

    fn meal(id: &str, name: &str, category: &str) -> MenuEntry {
        MenuEntry::with_id(
            id,
            NewMenuEntry {
                item_name: name.to_string(),
                description: format!("{} description", name),
                price: dec!(5.00),
                category: category.to_string(),
            },
        )
    }

    fn ids(items: &[MenuEntry]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_replace_all_mirrors_filtered_view() {
        let mut collection = Collection::default();
        collection.replace_all(vec![meal("1", "Burger", "Mains"), meal("2", "Cake", "Desserts")]);

        assert_eq!(ids(collection.items()), vec!["1", "2"]);
        assert_eq!(collection.items(), collection.filtered());
    }

    #[test]
    fn test_append_merge_remove_keep_views_in_step() {
        let mut collection = Collection::default();
        collection.append(meal("1", "Burger", "Mains"));
        collection.append(meal("2", "Cake", "Desserts"));

        assert!(collection.merge("1", |m| m.price = dec!(7.25)));
        assert_eq!(collection.get("1").unwrap().price, dec!(7.25));
        assert_eq!(collection.filtered()[0].price, dec!(7.25));

        assert!(collection.remove("2"));
        assert_eq!(ids(collection.items()), vec!["1"]);
        assert_eq!(ids(collection.filtered()), vec!["1"]);

        assert!(!collection.remove("2"));
        assert!(!collection.merge("missing", |m| m.price = dec!(1.00)));
    }

    #[test]
    fn test_active_filter_applies_to_mutations() {
        let mut collection = Collection::default();
        collection.replace_all(vec![meal("1", "Burger", "Mains"), meal("2", "Cake", "Desserts")]);
        collection.apply_filter(CatalogFilter {
            category: Some("Mains".to_string()),
            search: None,
        });
        assert_eq!(ids(collection.filtered()), vec!["1"]);

        collection.append(meal("3", "Pie", "Desserts"));
        assert_eq!(ids(collection.filtered()), vec!["1"]);
        assert_eq!(collection.len(), 3);

        // moving a row into the filtered category keeps base order
        collection.merge("2", |m| m.category = "Mains".to_string());
        assert_eq!(ids(collection.filtered()), vec!["1", "2"]);

        collection.merge("1", |m| m.category = "Sides".to_string());
        assert_eq!(ids(collection.filtered()), vec!["2"]);

        collection.apply_filter(CatalogFilter::default());
        assert_eq!(collection.items(), collection.filtered());
    }

    #[test]
    fn test_loading_flag() {
        let mut collection: Collection<MenuEntry> = Collection::default();
        assert!(!collection.is_loading());
        collection.set_loading(true);
        assert!(collection.is_loading());
        assert!(collection.is_empty());
    }
}
