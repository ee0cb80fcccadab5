//! Chess opening names by position.
//!
//! This crate maps positions to the names of the openings that reach them.
//! It includes a small built-in book and can load larger ones from JSON:
//!
//! ```json
//! [{ "eco": "B20", "name": "Sicilian Defense", "moves": ["e2e4", "c7c5"] }]
//! ```
//!
//! [`OpeningBook`] implements [`chess_session::OpeningLookup`].

pub mod builtin;
pub mod book;
pub mod opening;

pub use book::{DatabaseError, OpeningBook};
pub use opening::Opening;
