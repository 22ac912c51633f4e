//! Relay network layer: accepts TCP connections and drives `RelayState`

use crate::relay::{BrokenSession, ConnectionSerial, RelayState};
use log::{debug, error, info, warn};
use shared::framing::read_into;
use shared::{write_record, CommandBytes, ProtocolError, RecordReassembler, TankId};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages sent from connection tasks to the main relay loop
#[derive(Debug)]
pub enum ServerMessage {
    RecordReceived {
        id: TankId,
        serial: ConnectionSerial,
        record: CommandBytes,
    },
    ConnectionClosed {
        id: TankId,
        serial: ConnectionSerial,
    },
}

/// Relay server owning the listener and all session bookkeeping
pub struct RelayServer {
    listener: TcpListener,
    state: RelayState,
    next_serial: ConnectionSerial,
    readers: HashMap<TankId, JoinHandle<()>>,
    records_relayed: u64,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl RelayServer {
    pub async fn bind(addr: &str) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(RelayServer {
            listener,
            state: RelayState::new(),
            next_serial: 0,
            readers: HashMap::new(),
            records_relayed: 0,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Registers a freshly accepted connection and spawns its reader and
    /// writer tasks.
    fn accept_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let serial = self.next_serial;
        self.next_serial += 1;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }
        let (reader, writer) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let id = match self.state.join(serial, addr, outbound_tx) {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to register connection from {}: {}", addr, e);
                return;
            }
        };
        info!("Connection from {} got assigned ID {}", addr, id);

        self.spawn_writer(id, serial, writer, outbound_rx);
        let reader = self.spawn_reader(id, serial, reader);
        self.readers.insert(id, reader);
    }

    /// Spawns the task that frames inbound bytes into records
    fn spawn_reader(
        &self,
        id: TankId,
        serial: ConnectionSerial,
        mut reader: OwnedReadHalf,
    ) -> JoinHandle<()> {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut reassembler = RecordReassembler::new();

            loop {
                match read_into(&mut reader, &mut reassembler).await {
                    Ok(_) => {
                        for record in reassembler.drain_records() {
                            let message = ServerMessage::RecordReceived { id, serial, record };
                            if server_tx.send(message).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        match e {
                            ProtocolError::ConnectionBroken => debug!("Client {} closed", id),
                            other => warn!("Read from client {} failed: {}", id, other),
                        }
                        let _ = server_tx.send(ServerMessage::ConnectionClosed { id, serial });
                        return;
                    }
                }
            }
        })
    }

    /// Spawns the task that drains a session's outbound queue onto the socket
    fn spawn_writer(
        &self,
        id: TankId,
        serial: ConnectionSerial,
        mut writer: OwnedWriteHalf,
        mut outbound_rx: mpsc::UnboundedReceiver<CommandBytes>,
    ) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            while let Some(record) = outbound_rx.recv().await {
                if let Err(e) = write_record(&mut writer, &record).await {
                    warn!("Write to client {} failed: {}", id, e);
                    let _ = server_tx.send(ServerMessage::ConnectionClosed { id, serial });
                    return;
                }
            }
        });
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::RecordReceived { id, serial, record } => {
                let broken = self.state.relay(id, serial, record);
                self.records_relayed += 1;
                if self.records_relayed % 500 == 0 {
                    debug!(
                        "{} records relayed, {} sessions active",
                        self.records_relayed,
                        self.state.len()
                    );
                }
                self.close_sessions(broken);
            }
            ServerMessage::ConnectionClosed { id, serial } => {
                self.close_sessions(vec![(id, serial)]);
            }
        }
    }

    /// Tears sessions down, following any further breakage uncovered while
    /// announcing the departures.
    fn close_sessions(&mut self, mut pending: Vec<BrokenSession>) {
        while let Some((id, serial)) = pending.pop() {
            if !self.state.is_current(id, serial) {
                continue;
            }
            if let Some(reader) = self.readers.remove(&id) {
                reader.abort();
            }

            match self.state.leave(id, serial) {
                Ok(more) => {
                    info!("Client {} disconnected", id);
                    pending.extend(more);
                }
                Err(e) => error!("Failed to announce departure of client {}: {}", id, e),
            }
        }
    }

    /// Main relay loop. Runs until the message channel closes.
    pub async fn run(mut self) -> shared::Result<()> {
        info!("Relay started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept_connection(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Relay shutting down");
                            break;
                        }
                    }
                },
            }
        }

        Ok(())
    }
}
