pub mod logical_aggregate;
