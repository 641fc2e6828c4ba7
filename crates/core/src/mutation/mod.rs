//! External mutation records.
//!
//! `raw` mirrors the REST payload byte-for-byte and is what the mutation
//! cache persists; `model` is the typed view the rest of the engine works
//! with, produced by [`Mutation::from_raw`].

pub mod error;
pub mod model;
pub mod raw;

pub use error::MutationError;
pub use model::{Mutation, MutationKind, MutationRow, VatLine};
pub use raw::{RawMutation, RawRow, RawVatLine};
