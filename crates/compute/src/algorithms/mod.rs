pub mod reachability;
pub mod sampling;
