//! Newline-delimited JSON framing used by the command-line driver.

pub mod reply_writer;
pub mod request_reader;
