//! Adapters binding the domain ports to real infrastructure.

pub mod leetcode;
pub mod notify;
pub mod openai;
pub mod sqlite;
