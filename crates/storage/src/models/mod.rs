mod ranking;
mod review;
mod submission;

pub use ranking::Ranking;
pub use review::Review;
pub use submission::Submission;
