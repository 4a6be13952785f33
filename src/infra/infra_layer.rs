// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "drive/mod.rs"]
pub mod drive;

#[path = "ai/mod.rs"]
pub mod ai;
