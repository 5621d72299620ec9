//! Drivers invoking the on-device benchmark engines
//!
//! Both drivers run through the device relay and return the raw text report
//! of each invocation; parsing happens in [`crate::parsers`].

pub mod generic;
pub mod vendor;

pub use self::generic::GenericRunnerDriver;
pub use self::vendor::{write_synthetic_input, VendorExecutorDriver};
