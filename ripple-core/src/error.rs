//! Error types shared by every ripple crate.

use crate::hooks::HookStage;
use crate::phase::Phase;
use thiserror::Error;

/// Boxed error returned by user-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A caller broke the scheduling contract.
///
/// These are programming errors. They are only reported when the manager runs
/// with [`Strictness::Strict`](crate::Strictness::Strict); lenient managers skip
/// the checks.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// `register` was called while no transaction was open.
    #[error("cannot register effects outside of a transaction")]
    NotInTransaction,

    /// `begin` was called while a transaction was already open.
    #[error("a transaction is already open; nested transactions are not supported")]
    TransactionAlreadyOpen,

    /// A handle referred to an effect that is no longer registered.
    #[error("effect in phase {phase} is not registered (already disposed?)")]
    StaleEffect {
        /// The phase the handle was issued for.
        phase: Phase,
    },

    /// An effect's dispatch was re-entered from inside its own dispatch.
    #[error("effect dispatch re-entered while already running")]
    ReentrantDispatch,

    /// A hook was invoked while another hook of the same effect was running.
    #[error("{stage} hook invoked while another hook of the same effect was running")]
    ReentrantHook {
        /// The hook that could not run.
        stage: HookStage,
    },
}

/// Effect scheduling errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EffectError {
    /// The caller broke the begin / register / commit contract.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// The requested phase is not part of the manager's phase order.
    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    /// A user hook failed. Not retried.
    #[error("{stage} hook failed: {source}")]
    Hook {
        /// Which hook failed.
        stage: HookStage,
        /// The hook's own error.
        source: BoxError,
    },

    /// Configuration could not be parsed or validated.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EffectError {
    /// Wrap a hook failure.
    pub fn hook(stage: HookStage, source: impl Into<BoxError>) -> Self {
        Self::Hook {
            stage,
            source: source.into(),
        }
    }

    /// The protocol violation, if this is one.
    pub fn as_protocol(&self) -> Option<&ProtocolViolation> {
        match self {
            Self::Protocol(violation) => Some(violation),
            _ => None,
        }
    }
}
