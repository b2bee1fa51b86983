//! Integration tests for storage objects

mod basic;
mod cli;
mod debounce_timing;
mod interference;
mod shutdown;
