pub mod ranking;
pub mod review;
