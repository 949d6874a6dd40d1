pub mod clock;
pub mod quiz;
pub mod result;
