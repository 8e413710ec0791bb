//! Input adaptation layer
//!
//! Turns whatever arrives at a unit's input (plain value, composite of
//! positional arguments, or stream) into the types the unit declares.

mod error;
mod input;
mod input_adapter;

pub use error::AdapterError;
pub use input::{Composite, InputValue, ValueStream};
pub use input_adapter::InputAdapter;
