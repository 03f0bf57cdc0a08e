//! Ledger engine for rotating savings committees.
//!
//! This crate is the heart of the workspace. It provides:
//! - The [`Snapshot`] of committees, members, payments and draws
//! - [`CommitteeLedger`], the state container applying all-or-nothing mutations
//! - Duration derivation from the member set and the half-share pairing protocol
//! - Late-payment and demerit calculation
//! - Draw eligibility and payout rules
//! - A bounded [`History`] for linear undo
//! - Read-only projections (payment grid, payer standings)
//! - Snapshot validation against the ledger invariants

pub mod config;
pub mod draw;
pub mod duration;
pub mod engine;
pub mod error;
pub mod history;
pub mod mutation;
pub mod pairing;
pub mod payer;
pub mod penalty;
pub mod projection;
pub mod snapshot;
pub mod traits;
pub mod validation;

pub use config::LedgerConfig;
pub use draw::{eligible_winners, next_draw_month, payout_amount};
pub use duration::derive_duration;
pub use engine::CommitteeLedger;
pub use error::{LedgerError, LedgerResult, RejectionKind};
pub use history::History;
pub use mutation::{CommitteeInput, DrawInput, MemberInput, PaymentInput};
pub use payer::{PayerKind, PayerRow};
pub use penalty::{LateAssessment, DUE_DAY};
pub use projection::{GridRow, PayerStanding, PaymentGrid, ProjectionBuilder};
pub use snapshot::Snapshot;
pub use traits::{LedgerReader, SnapshotSink};
pub use validation::{SnapshotValidator, ValidationReport, Violation, ViolationKind};
