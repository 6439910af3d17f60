//! Records, wire types and database plumbing for the vote integrity core.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
