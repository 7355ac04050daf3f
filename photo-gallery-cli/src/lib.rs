pub mod scan;
pub mod seed;
