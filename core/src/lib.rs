pub mod bench;
pub mod rt;
pub mod val;
