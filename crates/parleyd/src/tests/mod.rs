//! Test suites for the Parley daemon.

pub(crate) mod support;
