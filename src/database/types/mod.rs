mod user;

pub use user::{normalize_phone, ContactUpdate, UserLink};
