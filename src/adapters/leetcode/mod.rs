//! LeetCode GraphQL adapter.

pub mod client;
pub mod models;

pub use client::LeetCodeClient;
