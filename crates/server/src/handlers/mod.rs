pub mod agent;
pub mod direct;
pub mod general;
