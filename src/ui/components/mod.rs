pub mod chart;
pub mod high_scores;
pub mod mastery_grid;
pub mod menu;
pub mod progress_bar;
pub mod question_card;
pub mod results;
pub mod stats_dashboard;
pub mod stats_sidebar;
