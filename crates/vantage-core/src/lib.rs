//! Core runtime for Vantage.
//!
//! Everything here is single-threaded and host-driven: a [`Runtime`] owns
//! frame callback and timer registries, a [`FrameClock`] hands out
//! cancel-on-drop registrations against it, and [`MutableState`] cells push
//! value changes to watchers. Hosts (native loops, canvas shells, test
//! rules) drive the runtime by feeding it millisecond timestamps; the
//! runtime never blocks, sleeps, or spawns.

pub mod collections;
pub mod frame_clock;
pub mod platform;
pub mod runtime;
pub mod state;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, TimerRegistration};
pub use platform::{Clock, RuntimeScheduler};
pub use runtime::{DefaultScheduler, FrameCallbackId, Runtime, RuntimeHandle, TimerId};
pub use state::{MutableState, State, WatchHandle};
