#![allow(dead_code)]

pub mod fake_snapshot;
pub mod utils;
