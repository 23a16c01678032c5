pub mod availability;
pub mod form;
pub mod interview;
pub mod job;
pub mod profile;
pub mod submission;
pub mod user;
