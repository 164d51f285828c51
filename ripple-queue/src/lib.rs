#![deny(missing_docs)]
//! Arena-backed doubly linked queue with O(1) insertion and removal by handle.
//!
//! Nodes live in a slot vector and link to each other by index. Callers hold
//! [`NodeId`]s, which pair a slot index with the slot's generation, so a handle
//! to a removed node can never alias whatever later reuses its slot.
//!
//! Iteration that tolerates mutation goes through [`Pass`]es: the queue keeps
//! each active pass's cursor and repairs it when the node under it is removed,
//! so a pass never skips or revisits a surviving node no matter what the
//! visited code removes.

mod queue;

pub use queue::{Iter, NodeId, OrderedQueue, Pass, QueueError};
