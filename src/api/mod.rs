pub mod assignment;
pub mod auth;
pub mod health;
pub mod member;
pub mod notification;
pub mod schedule;
pub mod task_label;
pub mod tasting;
pub mod team;
