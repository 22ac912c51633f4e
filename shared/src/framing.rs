//! Record framing over a TCP byte stream.
//!
//! TCP delivers an unstructured stream: one read may hold half a record,
//! several records, or the tail of one and the head of the next. The
//! reassembler buffers whatever arrives and only ever hands out complete
//! [`COMMAND_LEN`]-byte records, keeping the remainder for the next read.

use crate::command::{CommandBytes, COMMAND_LEN};
use crate::error::{ProtocolError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the scratch buffer used for a single socket read.
pub const READ_CHUNK: usize = 1024;

#[derive(Debug, Default)]
pub struct RecordReassembler {
    buffer: Vec<u8>,
}

impl RecordReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Removes and returns the oldest complete record, if one is buffered.
    pub fn next_record(&mut self) -> Option<CommandBytes> {
        if self.buffer.len() < COMMAND_LEN {
            return None;
        }

        let mut record = [0u8; COMMAND_LEN];
        record.copy_from_slice(&self.buffer[..COMMAND_LEN]);
        self.buffer.drain(..COMMAND_LEN);
        Some(record)
    }

    pub fn drain_records(&mut self) -> Vec<CommandBytes> {
        let mut records = Vec::with_capacity(self.buffer.len() / COMMAND_LEN);
        while let Some(record) = self.next_record() {
            records.push(record);
        }
        records
    }

    pub fn has_record(&self) -> bool {
        self.buffer.len() >= COMMAND_LEN
    }

    /// Bytes buffered that do not yet form a whole record.
    pub fn partial_len(&self) -> usize {
        self.buffer.len() % COMMAND_LEN
    }
}

/// Performs one read into the reassembler. A zero-length read means the
/// peer closed the stream.
pub async fn read_into<R>(reader: &mut R, reassembler: &mut RecordReassembler) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK];
    let n = reader.read(&mut chunk).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionBroken);
    }
    reassembler.push(&chunk[..n]);
    Ok(n)
}

/// Writes a whole record, retrying short writes until every byte is out.
pub async fn write_record<W>(writer: &mut W, record: &CommandBytes) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < record.len() {
        let n = writer.write(&record[written..]).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionBroken);
        }
        written += n;
    }
    writer.flush().await?;
    Ok(())
}
