//! Common utilities for integration tests

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{FirstOrderIsomerization, Frozen};
pub use test_helpers::{
    assert_states_close, haber, quick_config, relative_error, scenario_with,
};
