// Re-export all model types
pub use self::collection::*;
pub use self::drafts::*;
pub use self::enums::*;
pub use self::errors::*;
pub use self::menu::*;
pub use self::notification::*;
pub use self::validation::*;

mod collection;
mod drafts;
mod enums;
mod errors;
mod menu;
mod notification;
mod validation;
