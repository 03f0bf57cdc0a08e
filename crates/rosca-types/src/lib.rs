//! Foundation types for the rotating-savings committee ledger.
//!
//! This crate provides the identifier, money, calendar and entity types used
//! throughout the workspace. Every other `rosca` crate depends on
//! `rosca-types`.
//!
//! # Key Types
//!
//! - [`CommitteeId`], [`MemberId`], [`PaymentId`], [`DrawId`]: opaque UUID v7 identifiers
//! - [`PayerId`]: a FULL member id or a canonical half-share pair id
//! - [`Amount`]: non-negative currency amount
//! - [`MonthYear`]: `YYYY-MM` month token on the UTC calendar
//! - [`Committee`], [`Member`], [`Payment`], [`Draw`]: persisted entity records

pub mod entity;
pub mod error;
pub mod ids;
pub mod money;
pub mod month;

pub use entity::{Committee, Draw, Member, Payment, ShareType};
pub use error::TypeError;
pub use ids::{CommitteeId, DrawId, MemberId, PayerId, PaymentId};
pub use money::Amount;
pub use month::MonthYear;
