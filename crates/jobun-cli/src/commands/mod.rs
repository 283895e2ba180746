pub mod drill;
pub mod extract;
pub mod history;
pub mod init;
pub mod stats;
