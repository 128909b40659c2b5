//! RPC boundary: typed requests in, projected responses or status codes out.

pub mod response;
pub mod service;
pub mod status;
