// Repositories module - remote table access layer

pub mod drink_repository;
pub mod meal_repository;
pub mod table_manager;
mod table_support;


pub use drink_repository::{DrinkRepository, DynamoDbDrinkRepository};
pub use meal_repository::{DynamoDbMealRepository, MealRepository};
pub use table_manager::TableManager;
