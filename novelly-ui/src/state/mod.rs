//! State Management
//!
//! Global application state and the browser storage backend.

pub mod global;
pub mod storage;
pub mod timer;

pub use global::{confirm, log_error, provide_global_state, GlobalState, ToastKind};
pub use timer::TimerSlot;
