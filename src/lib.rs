//! Keyboard-navigation accessibility checks for a running application
//! screen.
//!
//! The [`explorer`] walks the focus order with focus-advance events until it
//! cycles, the [`audit`] compares what it reached with every clickable
//! element, and [`frame`] compares captures to validate visual focus
//! feedback. Devices are reached only through the traits in [`device`].

pub mod audit;
pub mod cli;
pub mod device;
pub mod explorer;
pub mod frame;
pub mod node;
pub mod render;
pub mod report;
pub mod suite;
pub mod trace;
