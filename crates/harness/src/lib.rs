//! Headless harness for the flowdeck core: configuration, demo seed
//! data, and the scripted scenario run by the binary.

pub mod config;
pub mod seed;
