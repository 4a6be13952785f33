// The core module contains all portal logic.
// Each feature gets its own submodule. Nothing in here knows about HTTP or
// the terminal; those live in `infra/` and `terminal/`.

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "drive/mod.rs"]
pub mod drive;

#[path = "portal/mod.rs"]
pub mod portal;
