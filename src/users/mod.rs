mod models;
mod service;

pub use models::{FormMode, Role, User, UserForm, UserStats};
pub use service::{DeleteOutcome, Refreshed, UserDirectory};
