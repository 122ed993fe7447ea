//! Analysis module - vitals synthesis for presentation

mod vitals;

pub use vitals::*;
