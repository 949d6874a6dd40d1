pub mod achievements;
pub mod difficulty;
pub mod distractor;
pub mod hints;
pub mod insights;
pub mod question;
pub mod quiz_engine;
pub mod rng;
pub mod score_book;
pub mod table_progress;
