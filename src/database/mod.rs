mod errors;
mod services;
mod types;

pub use errors::DatabaseError;
pub use services::{InMemoryUserDirectory, PostgrestUserDirectory, UserDirectory};
pub use types::{normalize_phone, ContactUpdate, UserLink};
