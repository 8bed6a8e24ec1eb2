//! Schema fixtures for tests.
//!
//! Fixtures are loaded at compile time using `include_str!`.
//!
//! ## Available Fixtures
//!
//! - [`PETS`] - users with a self-referencing spouse and owned pets
//! - [`GROUPS`] - many-to-many memberships, friends and followers
//! - [`FILES`] - files owned by users and typed by file types, with indexes

/// User/Pet schema.
///
/// Contains:
/// - `User.spouse`: unique self-reference (O2O, bidirectional)
/// - `User.pets` / `Pet.owner`: O2M / M2O on `pets.owner_id`
pub const PETS: &str = include_str!("pets.json");

/// User/Group schema.
///
/// Contains:
/// - `Group.users` / `User.groups`: M2M through `group_users`
/// - `User.friends`: self-referencing M2M through `user_friends`
/// - `User.following` / `User.followers`: assoc-inverse M2M through `user_following`
pub const GROUPS: &str = include_str!("groups.json");

/// User/Card/FileType/File schema.
///
/// Contains:
/// - `User.card` / `Card.owner`: O2O on `cards.owner_id`
/// - `User.files` / `File.owner` and `FileType.files` / `File.type`: O2M / M2O
/// - three indexes on `files`, one of them over relation columns
pub const FILES: &str = include_str!("files.json");
