// src/domain/core.rs

/// Numeric key of a catalogue item; the auction shares the item's id.
pub type ItemId = i64;

/// Numeric key of a signed-up user.
pub type UserId = i64;
