//! Domain models shared by Grocify services

pub mod item;
pub mod user;

pub use item::{ArchivedItem, CreateItemRequest, Item};
pub use user::{CreateUserRequest, User};
