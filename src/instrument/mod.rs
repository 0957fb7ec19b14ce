//! Instrument Module - turns automation operations into reported steps
//!
//! - `StepInstrumentor`: wraps one operation (blocking or suspending)
//! - `Installer`: applies the descriptor tables once per process
//! - `PatchRegistry`: which (convention, target, operation) are wrapped
//! - `catalog`: descriptor tables for page, locator and assertion targets
//! - `TitleRule`: call-like step titles derived from arguments

pub mod catalog;
mod installer;
mod step;
mod title;

pub use catalog::{descriptor, operations_for, OperationDescriptor};
pub use installer::{Installer, PatchKey, PatchRegistry};
pub use step::{StepInstrumentor, CANCELLED, PANICKED};
pub use title::{Arg, Receiver, TitleRule, MISSING, UNDESCRIBED};
