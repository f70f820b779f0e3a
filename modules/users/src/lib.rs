// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE WIRING ===
pub mod module;
pub use module::{UsersModule, UsersModuleConfig};

// === INTERNAL MODULES ===
// Exposed for the integration tests under tests/; the HTTP surface and the
// `contract` models are the stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
