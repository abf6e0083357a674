//! Device protocol and session handling

pub mod link;
pub mod protocol;
