//! Shared Protocol Buffer definitions for protopipe.
//!
//! This crate contains the address book wire schema and the Rust types
//! generated from it at build time. Producers encode `Person` into record
//! values; consumers decode record values back into `Person`.

// Generated protobuf modules via `prost_build` in build.rs

/// Address book wire protocol
pub mod addressbook {
    pub mod v1 {
        include!(concat!(env!("OUT_DIR"), "/addressbook.v1.rs"));
    }
}

// Re-export the message types for convenience
pub use addressbook::v1::Person;
