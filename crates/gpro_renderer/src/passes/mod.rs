pub mod submission;

pub use submission::SubmissionStage;
