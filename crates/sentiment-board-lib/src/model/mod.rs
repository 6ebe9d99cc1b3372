//! Plain data types shared by the store, service and renderer.

pub mod comment_record;
pub mod sentiment;
