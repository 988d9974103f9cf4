pub mod flexible;
pub mod in_flight;
pub mod time;
