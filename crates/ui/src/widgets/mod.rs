pub mod carousel;
pub mod generator;
