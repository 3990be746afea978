//! End-to-end tests for the answer pipeline.

mod pipeline;
