pub mod estimate;
pub mod wire;
