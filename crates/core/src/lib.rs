#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod quiz;
pub mod remediation;
pub mod report;
pub mod scoring;
pub mod session;
pub mod time;

pub use error::Error;
pub use time::Clock;
