pub mod crime;
pub mod lending;
