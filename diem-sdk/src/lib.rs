#![deny(missing_docs)]

//! Diem Client SDK - Complete SDK.
//!
//! Re-exports all Diem SDK components for convenient single-crate usage.

pub use diem_primitives as primitives;
pub use diem_types as types;
pub use diem_client as client;
