// The core module contains all business logic.
// Each feature gets its own submodule. Nothing in here knows about Discord.

#[path = "config/mod.rs"]
pub mod config;

#[path = "status/mod.rs"]
pub mod status;

#[path = "presence/presence_service.rs"]
pub mod presence;

#[path = "pin/mod.rs"]
pub mod pin;

#[path = "monitor/mod.rs"]
pub mod monitor;
