// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "query/mod.rs"]
pub mod query;

#[path = "pin/mod.rs"]
pub mod pin;
