// handlers/mod.rs - Handler tiers
//
// Public (no auth) -> Protected (JWT auth, exhibition and admin checks per handler)
pub mod protected;
pub mod public;
