#![allow(dead_code)]

pub use gantry_test_utils::init_tracing;
