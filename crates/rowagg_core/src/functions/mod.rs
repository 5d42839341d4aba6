pub mod aggregate;
pub mod documentation;
pub mod function_set;
pub mod registry;
