pub mod arrays;
pub mod config;
pub mod execution;
pub mod explain;
pub mod functions;
pub mod hash;
pub mod logical;
pub mod testutil;
