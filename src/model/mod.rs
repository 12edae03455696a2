//! The core data model: spending rows in, alert message out.
//!
//! These types form a linear pipeline of pure transformations:
//! raw rows -> [`SpendingReport`] -> [`Overspend`] (against [`Limits`]) ->
//! [`AlertMessage`]. Each stage builds a new immutable value; nothing here
//! performs I/O.

mod alert;
mod limits;
mod overspend;
mod spending;

pub use alert::{compose_alert, compose_push, AlertMessage};
pub use limits::{Limits, NoOverlapError};
pub use overspend::Overspend;
pub use spending::{FormatError, SpendingReport, DEFAULT_MONTH_KEY};
