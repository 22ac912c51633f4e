//! Client side of the relay session: handshake, outbound records and
//! non-blocking inbound framing.

use crate::registry::{Dispatch, RemoteRegistry};
use log::{debug, info, warn};
use shared::{write_record, Command, ProtocolError, RecordReassembler, Result, TankId};
use std::io::ErrorKind;
use tokio::net::TcpStream;

pub struct SessionClient {
    stream: TcpStream,
    reassembler: RecordReassembler,
    tank_id: TankId,
    remotes: RemoteRegistry,
    records_received: u64,
}

impl SessionClient {
    /// Connects to the relay and waits for the id assignment, which is always
    /// the first record on a fresh connection.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        let mut reassembler = RecordReassembler::new();
        while !reassembler.has_record() {
            stream.readable().await?;
            read_available(&stream, &mut reassembler)?;
        }

        let assignment = match reassembler.next_record() {
            Some(record) => Command::decode(&record)?,
            None => return Err(ProtocolError::ConnectionBroken),
        };
        let tank_id = assignment.tank_id.ok_or(ProtocolError::InvalidField {
            field: "tank_id",
            value: -1,
        })?;
        info!("Connected to {}, assigned tank id {}", addr, tank_id);

        let mut client = SessionClient {
            stream,
            reassembler,
            tank_id,
            remotes: RemoteRegistry::new(),
            records_received: 0,
        };
        // Catch-up records may arrive in the same segment as the assignment.
        client.dispatch_buffered()?;
        Ok(client)
    }

    pub fn tank_id(&self) -> TankId {
        self.tank_id
    }

    pub fn records_received(&self) -> u64 {
        self.records_received
    }

    pub async fn send_command(&mut self, command: &Command) -> Result<()> {
        let record = command.encode()?;
        write_record(&mut self.stream, &record).await
    }

    /// Reads whatever is available without waiting and queues every complete
    /// record for its remote tank. Returns the number of records dispatched.
    pub fn poll(&mut self) -> Result<usize> {
        read_available(&self.stream, &mut self.reassembler)?;
        self.dispatch_buffered()
    }

    /// Oldest pending command for remote tank `id`.
    pub fn recv_command(&mut self, id: TankId) -> Option<Command> {
        self.remotes.recv_command(id)
    }

    pub fn remotes(&self) -> &RemoteRegistry {
        &self.remotes
    }

    pub fn remotes_mut(&mut self) -> &mut RemoteRegistry {
        &mut self.remotes
    }

    fn dispatch_buffered(&mut self) -> Result<usize> {
        let mut dispatched = 0;
        while let Some(record) = self.reassembler.next_record() {
            let command = Command::decode(&record)?;
            self.records_received += 1;
            if self.remotes.dispatch(command, Some(self.tank_id)) == Dispatch::Ignored {
                debug!("Ignored record {:?}", command);
            }
            dispatched += 1;
        }
        Ok(dispatched)
    }
}

/// Drains the socket's receive buffer into `reassembler` without blocking.
/// Returns the number of bytes read, zero meaning nothing was pending.
fn read_available(stream: &TcpStream, reassembler: &mut RecordReassembler) -> Result<usize> {
    let mut chunk = [0u8; shared::framing::READ_CHUNK];
    let mut total = 0;

    loop {
        match stream.try_read(&mut chunk) {
            Ok(0) => return Err(ProtocolError::ConnectionBroken),
            Ok(n) => {
                reassembler.push(&chunk[..n]);
                total += n;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(total),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
