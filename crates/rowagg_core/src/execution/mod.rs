pub mod aggregate;
pub mod operators;
pub mod planner;
pub mod source;
