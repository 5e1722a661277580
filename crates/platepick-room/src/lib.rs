//! Room state for Platepick.
//!
//! Rooms live in memory for the lifetime of the process. Every mutation
//! of a room goes through [`RoomRegistry`], which keeps each room's
//! read-modify-write atomic without a global lock.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, resolves invite codes, mutates
//!   membership and suggestions, keeps the per-room counter tally
//! - [`Room`] / [`Member`]: snapshots handed to callers
//! - [`InviteCodeGenerator`]: six-character shareable codes
//! - [`UserDirectory`]: resolves a user id to a display name

mod directory;
mod error;
mod invite;
mod registry;
mod room;

pub use directory::{InMemoryDirectory, UserDirectory};
pub use error::RoomError;
pub use invite::{INVITE_ALPHABET, INVITE_CODE_LENGTH, InviteCodeGenerator};
pub use registry::RoomRegistry;
pub use room::{Member, Room};
