pub mod picking;
pub mod spatial;
