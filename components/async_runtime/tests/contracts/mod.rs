//! Contract test harness for async_runtime
