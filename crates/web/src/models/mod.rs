//! Domain models for the printer registry.

pub mod printer;
pub mod session;
pub mod user;

pub use printer::Printer;
pub use session::{CurrentUser, FlashLevel, FlashMessage, keys as session_keys};
pub use user::{User, UserFlags};
