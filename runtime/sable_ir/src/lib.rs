//! Sable IR - core data types shared by the Sable runtime.
//!
//! This crate contains the leaf types everything else is built on:
//! - `Name` for interned identifiers
//! - `StringInterner` / `SharedInterner` for identifier storage
//! - `TypePath` for slash-separated class-tree paths
//! - `TypeId` / `ProcId` / `StringId` table indices
//! - The compiled load-manifest data model (`manifest`)
//!
//! # Design Philosophy
//!
//! - **Intern everything**: variable and proc names become `Name(u32)`,
//!   so every runtime table is keyed by a 4-byte copyable id.
//! - **Indices over pointers**: the manifest refers to types, procs, and
//!   strings by table index; the loader validates every index once and the
//!   runtime never bounds-checks again.

mod ids;
mod interner;
pub mod manifest;
mod name;
mod path;

pub use ids::{ProcId, StringId, TypeId};
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use path::TypePath;
