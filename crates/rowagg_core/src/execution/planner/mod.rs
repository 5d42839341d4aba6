pub mod plan_aggregate;
