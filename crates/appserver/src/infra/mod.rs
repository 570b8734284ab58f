pub mod auth;
pub mod chat;
pub mod db;
pub mod downstream;
pub mod firebase;
pub mod notifier;
pub mod storage;
