//! Admission and rotation policies.
//!
//! This module groups the knobs that control **who** may join and **how often**
//! the line may advance.
//!
//! ## Contents
//! - [`AdmissionPolicy`] ordered gates over a [`JoinRequest`]
//! - [`Toggles`], [`Toggle`] named booleans flipped by moderators at runtime
//! - [`CooldownGuard`] deadline-based rate guard for `next`
//!
//! ## Quick wiring
//! ```text
//! Engine::join(request)
//!      └─► AdmissionPolicy::evaluate(request, AdmissionContext { toggles, store, played, ledger })
//! Engine::next()
//!      └─► RotationController ─► CooldownGuard::is_cooling(now) / arm(now)
//! ```
//!
//! ## Defaults
//! - `queue_limit = 7`, variety window = 7 days.
//! - Cooldown = 10 s.
//! - Toggles: `limit`, `verbose` and `newsubperk` on; everything else off.

mod admission;
mod cooldown;
mod toggles;

pub use admission::{AdmissionContext, AdmissionPolicy, DEFAULT_QUEUE_LIMIT, JoinRequest, Verdict};
pub use cooldown::{CooldownGuard, DEFAULT_COOLDOWN, MAX_COOLDOWN, RotationState};
pub use toggles::{Toggle, Toggles};
