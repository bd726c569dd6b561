pub mod compare;
pub mod finalize;
pub mod gpa;
pub mod init;
pub mod report;
pub mod scale;
pub mod validate;
