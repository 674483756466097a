//! Shared access-control utilities for the staking contracts.
//!
//! This crate provides:
//! - [`Role`] grants stored per address.
//! - [`GuardianPolicy`] — whether rate-guardian checks are satisfied by the
//!   administrator or require a separately appointed guardian.

#![no_std]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod roles;

pub use roles::*;
