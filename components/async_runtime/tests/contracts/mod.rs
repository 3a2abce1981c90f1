//! Contract test target for async_runtime
