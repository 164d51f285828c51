#![deny(missing_docs)]
//! In-process implementation of ripple-core's [`Memoizer`](ripple_core::Memoizer).
//!
//! A [`Runtime`] owns a monotonically increasing revision clock. Every
//! [`Tracked`] cell stamps itself with the clock on write. Reading a cell
//! while a [`Memo`] body runs records the cell as a dependency; the memo
//! skips its next dispatch while none of its dependencies has been written
//! since the body last completed.
//!
//! Memos nest: dependencies of an inner memo, whether it ran or skipped,
//! are reported to the enclosing memo as well.

mod memo;
mod runtime;
mod tracked;

pub use memo::Memo;
pub use runtime::{Revision, Runtime};
pub use tracked::Tracked;
