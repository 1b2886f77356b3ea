use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of catalog entries the dashboard manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Meal,
    Drink,
}

impl EntryKind {
    /// Logical name of the remote table backing this kind
    pub fn table(&self) -> &'static str {
        match self {
            EntryKind::Meal => "menuItems",
            EntryKind::Drink => "drinks",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Meal => write!(f, "meal"),
            EntryKind::Drink => write!(f, "drink"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meal" | "meals" => Ok(EntryKind::Meal),
            "drink" | "drinks" => Ok(EntryKind::Drink),
            _ => Err(format!("Invalid entry kind: {}", s)),
        }
    }
}

/// Editable fields of a meal row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealField {
    ItemName,
    Description,
    Price,
    Category,
}

impl fmt::Display for MealField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealField::ItemName => write!(f, "item_name"),
            MealField::Description => write!(f, "description"),
            MealField::Price => write!(f, "price"),
            MealField::Category => write!(f, "category"),
        }
    }
}

impl FromStr for MealField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The add form calls the name field "name", the table calls it "item_name"
        match s.to_lowercase().as_str() {
            "item_name" | "itemname" | "name" => Ok(MealField::ItemName),
            "description" => Ok(MealField::Description),
            "price" => Ok(MealField::Price),
            "category" => Ok(MealField::Category),
            _ => Err(format!("Invalid meal field: {}", s)),
        }
    }
}

/// Editable fields of a drink row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkField {
    Name,
    Price,
    Category,
}

impl fmt::Display for DrinkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrinkField::Name => write!(f, "name"),
            DrinkField::Price => write!(f, "price"),
            DrinkField::Category => write!(f, "category"),
        }
    }
}

impl FromStr for DrinkField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "drink" => Ok(DrinkField::Name),
            "price" => Ok(DrinkField::Price),
            "category" | "categorydrinks" | "category_drinks" => Ok(DrinkField::Category),
            _ => Err(format!("Invalid drink field: {}", s)),
        }
    }
}

/// A field of whichever entry an edit session targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "lowercase")]
pub enum EditField {
    Meal(MealField),
    Drink(DrinkField),
}

impl EditField {
    /// Resolve a field name against the kind of entry being edited
    pub fn parse(kind: EntryKind, name: &str) -> Result<Self, String> {
        match kind {
            EntryKind::Meal => name.parse().map(EditField::Meal),
            EntryKind::Drink => name.parse().map(EditField::Drink),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EditField::Meal(_) => EntryKind::Meal,
            EditField::Drink(_) => EntryKind::Drink,
        }
    }
}

impl From<MealField> for EditField {
    fn from(field: MealField) -> Self {
        EditField::Meal(field)
    }
}

impl From<DrinkField> for EditField {
    fn from(field: DrinkField) -> Self {
        EditField::Drink(field)
    }
}
