pub mod handlers;
pub mod intake;
pub mod lifecycle;
pub mod listing;
pub mod repository;
