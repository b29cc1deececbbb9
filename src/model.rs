//! Platform entities as they appear on the wire.
//!
//! Field names follow the platform's camelCase JSON. Absent fields decode to their
//! defaults so partial responses stay usable.

pub mod data_connector;
pub mod device;
pub mod emulator;
pub mod membership;
pub mod notification_rule;
pub mod project;

pub use data_connector::*;
pub use device::*;
pub use emulator::*;
pub use membership::*;
pub use notification_rule::*;
pub use project::*;
