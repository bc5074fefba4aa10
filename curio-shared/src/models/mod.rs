/// Database models
///
/// Each model owns its CRUD operations as associated functions taking a
/// `PgPool`. Every collection and item query is scoped by the owning user
/// id; a record that exists but belongs to someone else is indistinguishable
/// from one that doesn't exist.

pub mod collection;
pub mod item;
pub mod user;
