// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (JWT auth, plus self-only checks on account writes)

pub mod public;
pub mod protected;

mod utils;
