//! `astrovault-events` -- typed in-process event bus for the wizard.
//!
//! Step change reports, user-facing notices and submission outcomes are
//! broadcast over one channel so any number of observers (UI shells,
//! loggers, tests) can follow a wizard instance without polling.

pub mod bus;

pub use bus::{Notice, Severity, WizardBus, WizardEvent};
