//! Domain services used by the HTTP routes and the background sweeper.
//!
//! ARCHITECTURE
//! ============
//! Service modules own presence and visibility rules over the injected
//! stores so route handlers can stay focused on request translation.

pub mod messages;
pub mod presence;
pub mod sweeper;
