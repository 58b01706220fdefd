/// Reminder scheduling
///
/// `resolver` turns reminder specs into delays; `scheduler` owns the pending
/// one-shot jobs and cancels them per habit.

pub mod resolver;
pub mod scheduler;

pub use resolver::*;
pub use scheduler::*;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that make a single reminder unresolvable
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Local time {local} does not exist in the current time zone")]
    NonexistentLocalTime { local: NaiveDateTime },

    #[error("Delay until {local} is out of range")]
    OutOfRange { local: NaiveDateTime },
}
