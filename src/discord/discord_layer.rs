// Discord layer - commands and serenity adapters.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "pinning/mod.rs"]
pub mod pinning;

// Re-export command types for convenience
pub use commands::status::Data;
