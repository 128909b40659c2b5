use crate::error::Result;
use crate::interfaces::rpc::service::RpcReply;
use std::io::Write;

/// Writes one JSON reply per line.
pub struct ReplyWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReplyWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_reply(&mut self, reply: &RpcReply) -> Result<()> {
        serde_json::to_writer(&mut self.writer, reply)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
