//! Domain models for the homeo-records system.

mod followup;
mod form;
mod patient;

pub use followup::*;
pub use form::*;
pub use patient::*;
