pub mod datetime;
pub mod error;
pub mod response;
pub mod slug;
