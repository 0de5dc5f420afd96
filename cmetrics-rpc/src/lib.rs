pub mod custom_metrics;
pub mod discovery;
pub mod meta;
