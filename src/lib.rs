#![forbid(unsafe_code)]

pub mod batch;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod datamodel;
pub mod error;
pub mod http;
pub mod monitoring;
pub mod series;
pub mod stack;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
