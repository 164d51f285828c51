//! Test doubles for the capability traits.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that make scheduling behaviour observable in tests.

mod recording_hooks;
mod schedulers;
mod stub_memoizer;

pub use recording_hooks::{EventLog, HookCall, RecordingHooks};
pub use schedulers::{DeferredScheduler, RecordingScheduler};
pub use stub_memoizer::StubMemoizer;
