pub mod init;
pub mod content;
pub mod serve;
