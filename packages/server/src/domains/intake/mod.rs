//! Intake domain - admission of `{url, email}` requests onto the queue

pub mod denylist;
pub mod gate;
pub mod validation;

pub use denylist::Denylist;
pub use gate::{rate_key, IntakeError, IntakeGate};
pub use validation::{check_fields, FieldError};
