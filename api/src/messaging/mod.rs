pub mod backoff;
pub mod handler;
pub mod receiver;
pub mod topic;
