use crate::runtime::{Revision, Runtime, Tag};
use ripple_core::error::EffectError;
use ripple_core::tracking::{Body, Dispatch};
use std::fmt;

struct Snapshot {
    tags: Vec<Tag>,
    validated_at: Revision,
}

impl Snapshot {
    fn is_valid(&self) -> bool {
        self.tags.iter().all(|t| t.revision() <= self.validated_at)
    }
}

/// A body that re-runs only when something it read has been written.
///
/// A body that fails records no snapshot, so the next dispatch runs it again.
pub struct Memo {
    runtime: Runtime,
    body: Body,
    last: Option<Snapshot>,
}

impl Memo {
    pub(crate) fn new(runtime: Runtime, body: Body) -> Self {
        Self {
            runtime,
            body,
            last: None,
        }
    }

    /// Whether the next dispatch would skip the body.
    pub fn is_fresh(&self) -> bool {
        self.last.as_ref().is_some_and(Snapshot::is_valid)
    }

    /// Number of distinct tracked values read by the last successful run.
    pub fn dependency_count(&self) -> usize {
        self.last.as_ref().map_or(0, |s| s.tags.len())
    }
}

impl Dispatch for Memo {
    fn dispatch(&mut self) -> Result<(), EffectError> {
        if let Some(snapshot) = self.last.as_ref().filter(|s| s.is_valid()) {
            self.runtime.record_all(&snapshot.tags);
            tracing::trace!(deps = snapshot.tags.len(), "ripple.memo.skip");
            return Ok(());
        }

        let body = &mut self.body;
        let (result, tags) = self.runtime.track(|| body());
        self.runtime.record_all(&tags);
        match result {
            Ok(()) => {
                tracing::trace!(deps = tags.len(), "ripple.memo.run");
                self.last = Some(Snapshot {
                    tags,
                    validated_at: self.runtime.revision(),
                });
                Ok(())
            }
            Err(err) => {
                self.last = None;
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("fresh", &self.is_fresh())
            .field("deps", &self.dependency_count())
            .finish_non_exhaustive()
    }
}
