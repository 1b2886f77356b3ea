use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned by the remote table on insert
pub type EntryId = String;

/// A meal on the menu (`menuItems` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: EntryId,
    pub item_name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
}

/// A drink on the menu (`drinks` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    pub id: EntryId,
    pub name: String,
    pub price: Decimal,
    pub category: String,
}

/// Insert payload for a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMenuEntry {
    pub item_name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
}

/// Insert payload for a drink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDrinkEntry {
    pub name: String,
    pub price: Decimal,
    pub category: String,
}

/// Update payload for a meal; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPatch {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
}

/// Update payload for a drink; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrinkPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
}

/// Display filter applied to a base collection to derive its filtered view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CatalogFilter {
    /// A filter that lets every row through
    pub fn is_cleared(&self) -> bool {
        self.category.as_deref().map_or(true, |c| c.trim().is_empty())
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }
}

/// Common view over meal and drink rows used by the mirrored collections
pub trait CatalogRow: Clone + Send + Sync {
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    fn category(&self) -> &str;

    fn matches(&self, filter: &CatalogFilter) -> bool {
        if let Some(category) = filter.category.as_deref() {
            let category = category.trim();
            if !category.is_empty() && !self.category().eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(search) = filter.search.as_deref() {
            let search = search.trim().to_lowercase();
            if !search.is_empty() && !self.display_name().to_lowercase().contains(&search) {
                return false;
            }
        }

        true
    }
}

fn generate_id(prefix: char) -> EntryId {
    format!(
        "{}{}",
        prefix,
        Uuid::new_v4()
            .simple()
            .to_string()
            .get(0..8)
            .unwrap_or("00000000")
    )
}

impl MenuEntry {
    /// Create a meal row with a freshly generated id
    pub fn new(request: NewMenuEntry) -> Self {
        Self::with_id(generate_id('M'), request)
    }

    pub fn with_id(id: impl Into<EntryId>, request: NewMenuEntry) -> Self {
        Self {
            id: id.into(),
            item_name: request.item_name,
            description: request.description,
            price: request.price,
            category: request.category,
        }
    }

    /// Merge the set fields of a patch into this row
    pub fn apply(&mut self, patch: &MealPatch) {
        if let Some(ref item_name) = patch.item_name {
            self.item_name = item_name.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
    }
}

impl DrinkEntry {
    /// Create a drink row with a freshly generated id
    pub fn new(request: NewDrinkEntry) -> Self {
        Self::with_id(generate_id('D'), request)
    }

    pub fn with_id(id: impl Into<EntryId>, request: NewDrinkEntry) -> Self {
        Self {
            id: id.into(),
            name: request.name,
            price: request.price,
            category: request.category,
        }
    }

    /// Merge the set fields of a patch into this row
    pub fn apply(&mut self, patch: &DrinkPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
    }
}

impl CatalogRow for MenuEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.item_name
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl CatalogRow for DrinkEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }
}
