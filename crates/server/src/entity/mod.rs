pub mod final_score;
pub mod question;
pub mod submission;
