use serde::{Deserialize, Serialize};

use super::{
    parse_price, validate_price, validate_required, DrinkEntry, DrinkField, DrinkPatch,
    EditField, EntryId, EntryKind, MealField, MealPatch, MenuEntry, NewDrinkEntry, NewMenuEntry,
    ValidationError,
};

/// Raw form input for a meal, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

/// Raw form input for a drink, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkDraft {
    pub drink: String,
    pub price: String,
    pub category_drinks: String,
}

impl MealDraft {
    pub fn set(&mut self, field: MealField, value: impl Into<String>) {
        let value = value.into();
        match field {
            MealField::ItemName => self.name = value,
            MealField::Description => self.description = value,
            MealField::Price => self.price = value,
            MealField::Category => self.category = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl DrinkDraft {
    pub fn set(&mut self, field: DrinkField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DrinkField::Name => self.drink = value,
            DrinkField::Price => self.price = value,
            DrinkField::Category => self.category_drinks = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<&MenuEntry> for MealDraft {
    fn from(entry: &MenuEntry) -> Self {
        Self {
            name: entry.item_name.clone(),
            description: entry.description.clone(),
            price: entry.price.to_string(),
            category: entry.category.clone(),
        }
    }
}

impl From<&DrinkEntry> for DrinkDraft {
    fn from(entry: &DrinkEntry) -> Self {
        Self {
            drink: entry.name.clone(),
            price: entry.price.to_string(),
            category_drinks: entry.category.clone(),
        }
    }
}

impl TryFrom<&MealDraft> for NewMenuEntry {
    type Error = ValidationError;

    fn try_from(draft: &MealDraft) -> Result<Self, Self::Error> {
        let item_name = validate_required("name", &draft.name)?;
        let description = validate_required("description", &draft.description)?;
        let price = parse_price(&draft.price)?;
        validate_price(&price)?;
        let category = validate_required("category", &draft.category)?;

        Ok(Self {
            item_name: item_name.to_string(),
            description: description.to_string(),
            price,
            category: category.to_string(),
        })
    }
}

impl TryFrom<&DrinkDraft> for NewDrinkEntry {
    type Error = ValidationError;

    fn try_from(draft: &DrinkDraft) -> Result<Self, Self::Error> {
        let name = validate_required("drink", &draft.drink)?;
        let price = parse_price(&draft.price)?;
        validate_price(&price)?;
        let category = validate_required("categoryDrinks", &draft.category_drinks)?;

        Ok(Self {
            name: name.to_string(),
            price,
            category: category.to_string(),
        })
    }
}

impl TryFrom<&MealDraft> for MealPatch {
    type Error = ValidationError;

    /// Every field of an edit draft is sent as typed; only the price has to
    /// parse
    fn try_from(draft: &MealDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            item_name: Some(draft.name.clone()),
            description: Some(draft.description.clone()),
            price: Some(parse_price(&draft.price)?),
            category: Some(draft.category.clone()),
        })
    }
}

impl TryFrom<&DrinkDraft> for DrinkPatch {
    type Error = ValidationError;

    fn try_from(draft: &DrinkDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            name: Some(draft.drink.clone()),
            price: Some(parse_price(&draft.price)?),
            category: Some(draft.category_drinks.clone()),
        })
    }
}

/// A row handed to `begin_edit`
#[derive(Debug, Clone, PartialEq)]
pub enum EditRow {
    Meal(MenuEntry),
    Drink(DrinkEntry),
}

/// The single in-progress edit of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EditSession {
    Meal { id: EntryId, draft: MealDraft },
    Drink { id: EntryId, draft: DrinkDraft },
}

impl EditSession {
    /// Open a session on `id`, snapshotting the row's current values
    pub fn open(id: impl Into<EntryId>, row: &EditRow) -> Self {
        let id = id.into();
        match row {
            EditRow::Meal(entry) => EditSession::Meal {
                id,
                draft: MealDraft::from(entry),
            },
            EditRow::Drink(entry) => EditSession::Drink {
                id,
                draft: DrinkDraft::from(entry),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EditSession::Meal { id, .. } | EditSession::Drink { id, .. } => id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EditSession::Meal { .. } => EntryKind::Meal,
            EditSession::Drink { .. } => EntryKind::Drink,
        }
    }

    pub fn targets(&self, kind: EntryKind, id: &str) -> bool {
        self.kind() == kind && self.id() == id
    }

    /// Write `value` into the draft. Returns false when the field belongs to
    /// the other entry kind.
    pub fn set_field(&mut self, field: EditField, value: impl Into<String>) -> bool {
        match (self, field) {
            (EditSession::Meal { draft, .. }, EditField::Meal(field)) => {
                draft.set(field, value);
                true
            }
            (EditSession::Drink { draft, .. }, EditField::Drink(field)) => {
                draft.set(field, value);
                true
            }
            _ => false,
        }
    }
}
