//! The thread that owns the socket and drives the state machine.
//!
//! Everything enters through one event queue: commands from the handle and
//! I/O notifications from a per-socket reader thread. The actor processes
//! one event to completion at a time, so all state mutation is serialized.
//!
//! I/O events carry the generation of the socket they were read from. A
//! reset bumps the generation, so events that were already queued for a
//! dead socket are recognized and dropped: nothing decoded from an old
//! connection can reach the parent after its reset.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::machine::{Action, Machine};
use super::{CloseReason, Command, Options, Upcall};

pub(super) enum ActorEvent {
    Command(Command),
    Io { generation: u64, event: IoEvent },
}

pub(super) enum IoEvent {
    Data(Vec<u8>),
    Closed,
    Error(io::Error),
}

pub(super) struct Actor {
    host: String,
    port: u16,
    timeout: Duration,
    parent: Sender<Upcall>,
    events_tx: Sender<ActorEvent>,
    events: Receiver<ActorEvent>,
    machine: Machine,
    socket: Option<TcpStream>,
    /// Bumped on every connect and every close; I/O events from another
    /// generation are stale.
    generation: u64,
    /// When to try connecting again. `None` while a socket is up.
    retry_at: Option<Instant>,
}

impl Actor {
    pub(super) fn new(
        opts: &Options,
        parent: Sender<Upcall>,
        events_tx: Sender<ActorEvent>,
        events: Receiver<ActorEvent>,
    ) -> Actor {
        Actor {
            host: opts.host.clone(),
            port: opts.port,
            timeout: opts.timeout,
            parent,
            events_tx,
            events,
            machine: Machine::new(opts.version_set()),
            socket: None,
            generation: 0,
            retry_at: None,
        }
    }

    pub(super) fn run(mut self) {
        self.try_connect();
        loop {
            let event = match self.retry_at {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(timeout) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => {
                            self.try_connect();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                None => match self.events.recv() {
                    Ok(event) => event,
                    Err(_) => return,
                },
            };
            match event {
                ActorEvent::Command(Command::Stop) => {
                    self.close_socket();
                    return;
                }
                ActorEvent::Command(command) => self.handle_command(command),
                ActorEvent::Io { generation, event } if generation == self.generation => {
                    self.handle_io(event)
                }
                ActorEvent::Io { .. } => (),
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Send(message, reply) => {
                let result = match self.machine.send(*message) {
                    Ok(bytes) => {
                        // an Ok acknowledges queueing; a failing socket is
                        // reported through the connection_closed upcall
                        self.write(bytes);
                        Ok(())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::ControllingProcess(parent) => self.parent = parent,
            Command::MakeSlave => {
                self.machine.make_slave();
                debug!(target: "ofconn", "controller role is now {:?}", self.machine.role());
            }
            // stop is intercepted by the event loop
            Command::Stop => (),
        }
    }

    fn handle_io(&mut self, event: IoEvent) {
        let actions = match event {
            IoEvent::Data(bytes) => self.machine.data_received(&bytes),
            IoEvent::Closed => self.machine.connection_lost(CloseReason::TcpClosed),
            IoEvent::Error(err) => self
                .machine
                .connection_lost(CloseReason::TcpError(err.to_string())),
        };
        self.perform(actions);
    }

    fn perform(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Write(bytes) => {
                    if !self.write(bytes) {
                        // the write tore the connection down and the rest
                        // of this batch belongs to the dead socket
                        break;
                    }
                }
                Action::Deliver(upcall) => {
                    let _ = self.parent.send(upcall);
                }
                Action::Close(reason) => {
                    warn!(
                        target: "ofconn",
                        "connection to {}:{} closed: {}", self.host, self.port, reason
                    );
                    self.close_socket();
                    self.retry_at = Some(Instant::now() + self.timeout);
                }
            }
        }
    }

    // Returns false when the connection died under the write.
    fn write(&mut self, bytes: Vec<u8>) -> bool {
        let Some(socket) = &mut self.socket else {
            return false;
        };
        match socket.write_all(&bytes) {
            Ok(()) => true,
            Err(err) => {
                let actions = self
                    .machine
                    .connection_lost(CloseReason::TcpError(err.to_string()));
                self.perform(actions);
                false
            }
        }
    }

    fn try_connect(&mut self) {
        self.retry_at = None;
        match super::connect(&self.host, self.port) {
            Ok(socket) => self.connection_opened(socket),
            Err(err) => {
                // failed attempts are silent: no upcall, just the timer
                debug!(
                    target: "ofconn",
                    "connect to {}:{} failed: {}", self.host, self.port, err
                );
                self.retry_at = Some(Instant::now() + self.timeout);
            }
        }
    }

    fn connection_opened(&mut self, socket: TcpStream) {
        let reader = match socket.try_clone() {
            Ok(reader) => reader,
            Err(err) => {
                debug!(target: "ofconn", "socket clone failed: {}", err);
                self.retry_at = Some(Instant::now() + self.timeout);
                return;
            }
        };
        info!(target: "ofconn", "connected to {}:{}", self.host, self.port);
        self.generation += 1;
        self.socket = Some(socket);
        spawn_reader(self.generation, reader, self.events_tx.clone());
        match self.machine.connection_opened() {
            Ok(hello) => {
                self.write(hello);
            }
            Err(err) => {
                // encoding our own HELLO cannot realistically fail; give
                // up on the attempt if it ever does
                warn!(target: "ofconn", "hello encoding failed: {}", err);
                self.close_socket();
                self.retry_at = Some(Instant::now() + self.timeout);
            }
        }
    }

    fn close_socket(&mut self) {
        if let Some(socket) = self.socket.take() {
            let _ = socket.shutdown(Shutdown::Both);
        }
        self.generation += 1;
    }
}

// One blocking read per queue message: the actor consumes a chunk before
// the reader hands it the next one, so a fast controller cannot outrun the
// parser by more than the socket buffers.
fn spawn_reader(generation: u64, mut socket: TcpStream, events: Sender<ActorEvent>) {
    let error_events = events.clone();
    let spawned = thread::Builder::new()
        .name("ofconn-reader".to_string())
        .spawn(move || loop {
            let mut buffer = [0u8; 2048];
            let event = match socket.read(&mut buffer) {
                Ok(0) => IoEvent::Closed,
                Ok(n) => IoEvent::Data(buffer[..n].to_vec()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => IoEvent::Error(err),
            };
            let done = !matches!(event, IoEvent::Data(_));
            if events.send(ActorEvent::Io { generation, event }).is_err() || done {
                break;
            }
        });
    if let Err(err) = spawned {
        warn!(target: "ofconn", "failed to spawn the reader thread: {}", err);
        let _ = error_events.send(ActorEvent::Io {
            generation,
            event: IoEvent::Error(err),
        });
    }
}
