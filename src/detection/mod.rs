//! Detection module - threshold classification and alert lifecycle

mod classification;
mod alert;
mod haptics;

pub use classification::*;
pub use alert::*;
pub use haptics::*;
