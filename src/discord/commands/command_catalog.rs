// Discord commands module.
// Each feature gets its own command file.

pub mod status;

// Bot presence management
pub mod presence;
