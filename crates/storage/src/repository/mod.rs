pub mod ranking;
pub mod review;
pub mod submission;
