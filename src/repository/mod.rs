//! # Repository Module
//!
//! Data-access layer: each repository owns a pool handle and translates one
//! entity's domain operations into single autocommitted SQL statements.

pub mod notes;
pub mod reservations;
pub mod rooms;
pub mod users;

pub use notes::NoteRepository;
pub use reservations::ReservationRepository;
pub use rooms::RoomRepository;
pub use users::UserRepository;
