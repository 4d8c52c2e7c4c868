//! Commonly used imports
//!
//! Use `use bounce::prelude::*;` for quick access to the core primitives.

pub use crate::drive::Loop;
pub use crate::exec::LocalExecutor;
pub use crate::gather::Gather;
pub use crate::slot::{Producer, Slot};
