use rosca_types::{CommitteeId, DrawId, MemberId, MonthYear, PayerId, PaymentId};

/// Errors produced by ledger operations.
///
/// Every error is a rejection: the snapshot is left exactly as it was and no
/// history entry is recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("committee not found: {0}")]
    CommitteeNotFound(CommitteeId),

    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("draw not found: {0}")]
    DrawNotFound(DrawId),

    #[error("committee {committee} does not allow half shares")]
    HalfShareNotAllowed { committee: CommitteeId },

    #[error(
        "cannot disable half shares: committee {committee} has {count} half-share member(s)"
    )]
    HalfShareMembersExist { committee: CommitteeId, count: usize },

    #[error(
        "duration of committee {committee} would drop to {derived}, below {draws} recorded draw(s)"
    )]
    DurationBelowDraws {
        committee: CommitteeId,
        derived: u32,
        draws: usize,
    },

    #[error("{payer} is not a member or complete pair of committee {committee}")]
    UnknownPayer {
        committee: CommitteeId,
        payer: PayerId,
    },

    #[error("payment already recorded for {payer} in {month}")]
    DuplicatePayment { payer: PayerId, month: MonthYear },

    #[error("{winner} has already won a draw in committee {committee}")]
    AlreadyWon {
        committee: CommitteeId,
        winner: PayerId,
    },

    #[error("committee {committee} has already paid out all {duration} slot(s)")]
    DrawsExhausted { committee: CommitteeId, duration: u32 },

    #[error("{payer} has already won in committee {committee}; its share cannot be regrouped")]
    WinnerLocked {
        committee: CommitteeId,
        payer: PayerId,
    },

    #[error("a draw is already recorded for {month} in committee {committee}")]
    DuplicateDraw {
        committee: CommitteeId,
        month: MonthYear,
    },

    #[error("amount overflow")]
    AmountOverflow,

    #[error("month out of calendar range")]
    MonthOutOfRange,

    #[error("store error: {0}")]
    StoreError(String),
}

/// Coarse classification of a rejection, for callers deciding how to re-prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    /// Missing or malformed input.
    Validation,
    /// The referenced entity does not exist.
    NotFound,
    /// The change would break a ledger invariant.
    InvariantGuard,
    /// Persistence failed; in-memory state is unaffected.
    Persistence,
}

impl LedgerError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::MissingField(_)
            | Self::Invalid { .. }
            | Self::AmountOverflow
            | Self::MonthOutOfRange => RejectionKind::Validation,
            Self::CommitteeNotFound(_)
            | Self::MemberNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::DrawNotFound(_) => RejectionKind::NotFound,
            Self::HalfShareNotAllowed { .. }
            | Self::HalfShareMembersExist { .. }
            | Self::DurationBelowDraws { .. }
            | Self::UnknownPayer { .. }
            | Self::DuplicatePayment { .. }
            | Self::AlreadyWon { .. }
            | Self::DrawsExhausted { .. }
            | Self::WinnerLocked { .. }
            | Self::DuplicateDraw { .. } => RejectionKind::InvariantGuard,
            Self::StoreError(_) => RejectionKind::Persistence,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
