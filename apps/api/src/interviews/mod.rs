pub mod handlers;
pub mod lifecycle;
pub mod repository;
pub mod slot_lock;
