//! Application layer - Ports and change delivery
//!
//! Defines the interfaces backends and callers meet at, plus the
//! dispatcher that turns raw reads into de-duplicated notifications.

pub mod dispatch;
pub mod ports;

pub use dispatch::{ChangeDispatcher, Dispatch};
