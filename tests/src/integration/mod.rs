//! Cross-subsystem integration tests.

pub mod durability;
pub mod failures;
pub mod flows;
pub mod roundtrip;
