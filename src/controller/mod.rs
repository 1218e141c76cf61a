//! # Rotation controller
//!
//! Advances the line one entrant at a time and rate-limits itself with a
//! [`CooldownGuard`](crate::CooldownGuard).
//!
//! ```text
//!   next(is_mod) ──► mod? ──► cooling? ──► pop head ──► played += h ──► ledger.append
//!                      │          │            │                             │
//!              PermissionDenied RateLimited  NoOneInLine              (failure = warning)
//!                                              │
//!                              arm cooldown ◄──┴── peek next-up
//! ```
//!
//! ## Rules
//! - Cooldown is armed on every accepted call, including an empty line.
//! - A marker at the head serves the sub-list; popping the last sub-list member
//!   drops the marker in the same step.
//! - A ledger failure never undoes the pop.

mod rotation;

pub use rotation::{Advance, RotationController, Turn};
