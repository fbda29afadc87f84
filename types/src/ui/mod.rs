//! View state types for the front end.
//!
//! Pure data with no IO. The engine owns these; front ends only read them.

mod view_state;

pub use view_state::{Screen, Tab, ViewState};
