//! Millionisho: a Telegram bot that serves curated Instagram content,
//! gates it behind free-tier quotas and WordPress-issued licenses, and
//! writes hooks with an LLM.

pub mod access;
pub mod ai;
pub mod bot;
pub mod config;
pub mod content;
pub mod conversation;
pub mod db;
pub mod error;
pub mod licensing;
pub mod menu;
pub mod users;
