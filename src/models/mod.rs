pub mod employer;
pub mod listing;
pub mod vacancy;
