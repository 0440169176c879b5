//! A switch-side connection endpoint.
//!
//! A [`Client`] owns one TCP connection to an OpenFlow controller. It
//! performs the HELLO version negotiation, keeps reconnecting while the
//! controller is unreachable, filters what it forwards according to the
//! controller role and the asynchronous-message masks, and reports
//! everything else upward on an upcall channel:
//!
//! - [`Upcall::Connected`] once HELLO negotiation succeeds,
//! - [`Upcall::MessageReceived`] for every forwarded controller message,
//! - [`Upcall::ConnectionClosed`] each time the connection is torn down.
//!
//! The endpoint is an actor: a single thread owns the socket and the
//! parser, and every command is a message to that thread. [`Client::send`]
//! is therefore an acknowledgement of queueing, not of delivery.

use std::io;
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::packets::openflow::{Message, Version};
use crate::Error;

mod machine;
mod runtime;

/// The role the connected controller holds, as defined by the OpenFlow
/// specification. A slave controller cannot modify switch state and only
/// receives the asynchronous messages its mask allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Master,
    #[default]
    Equal,
    Slave,
}

/// Which asynchronous messages may be sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncMask {
    pub packet_in: bool,
    pub port_status: bool,
    pub flow_removed: bool,
}

/// The asynchronous-message masks, one applied while the controller is
/// master or equal, the other while it is slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncFilter {
    pub master_equal: AsyncMask,
    pub slave: AsyncMask,
}

impl Default for AsyncFilter {
    fn default() -> AsyncFilter {
        AsyncFilter {
            master_equal: AsyncMask {
                packet_in: true,
                port_status: true,
                flow_removed: true,
            },
            slave: AsyncMask {
                packet_in: true,
                port_status: false,
                flow_removed: false,
            },
        }
    }
}

/// Why a connection was torn down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloseReason {
    /// The preferred versions are below 4 and the controller spoke a
    /// version outside the configured set.
    #[error("unsupported version {0:?}")]
    UnsupportedVersion(Version),
    /// The version sets of the two endpoints do not intersect.
    #[error("no common version between {client:?} and {server:?}")]
    NoCommonVersion {
        client: Vec<Version>,
        server: Vec<Version>,
    },
    /// The first message on the connection was not a decodable HELLO.
    #[error("bad initial message")]
    BadInitialMessage,
    /// The controller closed the connection.
    #[error("tcp connection closed")]
    TcpClosed,
    /// The transport failed.
    #[error("tcp error: {0}")]
    TcpError(String),
    /// The byte stream could not be framed or decoded.
    #[error("bad data on the wire")]
    BadData(Vec<u8>),
}

/// Why [`Client::send`] refused a message.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The message type does not flow from switch to controller.
    #[error("not a switch-to-controller message")]
    BadMessage(Box<Message>),
    /// No connection is established.
    #[error("not connected")]
    NotConnected,
    /// The asynchronous-message filter suppressed the message.
    #[error("message filtered")]
    Filtered,
    /// The message could not be encoded.
    #[error("encode error: {0}")]
    Encode(Error),
}

/// An upward notification from the endpoint to its controlling process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upcall {
    /// HELLO negotiation succeeded; the connection is usable.
    Connected(Version),
    /// A controller message to act upon.
    MessageReceived(Message),
    /// The connection was torn down; the endpoint will retry.
    ConnectionClosed(CloseReason),
}

/// Construction options for a [`Client`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Controller host to connect to.
    pub host: String,
    /// Controller port to connect to.
    pub port: u16,
    /// Where upcalls are delivered. When absent, a fresh channel is
    /// created and its receiving half is available from
    /// [`Client::upcalls`].
    pub controlling_process: Option<mpsc::Sender<Upcall>>,
    /// The preferred protocol version.
    pub version: Version,
    /// Additional supported versions, merged with `version`.
    pub versions: Vec<Version>,
    /// How long to wait between reconnection attempts.
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            host: "127.0.0.1".to_string(),
            port: 6633,
            controlling_process: None,
            version: Version::OpenFlow1Dot3,
            versions: Vec::new(),
            timeout: Duration::from_millis(5000),
        }
    }
}

impl Options {
    // The configured version set: `versions` merged with `version`,
    // deduplicated and sorted by wire code.
    fn version_set(&self) -> Vec<Version> {
        let mut versions = self.versions.clone();
        versions.push(self.version);
        versions.sort_by_key(|v| u8::from(*v));
        versions.dedup();
        versions
    }
}

enum Command {
    Send(Box<Message>, mpsc::Sender<Result<(), SendError>>),
    ControllingProcess(mpsc::Sender<Upcall>),
    MakeSlave,
    Stop,
}

/// A handle on a running connection endpoint.
pub struct Client {
    commands: mpsc::Sender<runtime::ActorEvent>,
    upcalls: Option<mpsc::Receiver<Upcall>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Client {
    /// Spawn a connection endpoint. The first connection attempt starts
    /// immediately; its outcome, like every later one, is reported through
    /// the upcall channel.
    pub fn start(opts: Options) -> io::Result<Client> {
        let (parent, upcalls) = match opts.controlling_process.clone() {
            Some(parent) => (parent, None),
            None => {
                let (tx, rx) = mpsc::channel();
                (tx, Some(rx))
            }
        };
        let (commands, events) = mpsc::channel();
        let actor = runtime::Actor::new(&opts, parent, commands.clone(), events);
        let thread = thread::Builder::new()
            .name("ofconn-endpoint".to_string())
            .spawn(move || actor.run())?;
        Ok(Client {
            commands,
            upcalls,
            thread: Some(thread),
        })
    }

    /// Take the upcall receiver. Only available when no
    /// `controlling_process` was passed at construction, and only once.
    pub fn upcalls(&mut self) -> Option<mpsc::Receiver<Upcall>> {
        self.upcalls.take()
    }

    /// Queue a message for the controller.
    ///
    /// The message must be of a switch-to-controller type, the connection
    /// must be established, and the role/async filter must let the message
    /// through. The returned `Ok` acknowledges queueing on the socket, not
    /// delivery.
    pub fn send(&self, message: Message) -> Result<(), SendError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self
            .command(Command::Send(Box::new(message), reply_tx))
            .is_err()
        {
            return Err(SendError::NotConnected);
        }
        reply_rx.recv().unwrap_or(Err(SendError::NotConnected))
    }

    /// Rebind the upcall target to another channel.
    pub fn controlling_process(&self, parent: mpsc::Sender<Upcall>) {
        let _ = self.command(Command::ControllingProcess(parent));
    }

    /// Demote the controller role from master to slave. Does nothing when
    /// the current role is not master.
    pub fn make_slave(&self) {
        let _ = self.command(Command::MakeSlave);
    }

    /// Terminate the endpoint. The socket is closed; no upcall is sent.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn command(&self, command: Command) -> Result<(), mpsc::SendError<runtime::ActorEvent>> {
        self.commands.send(runtime::ActorEvent::Command(command))
    }

    fn shutdown(&mut self) {
        let _ = self.command(Command::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// Connect errors carry no state worth keeping; the endpoint retries on a
// timer and stays silent in between.
fn connect(host: &str, port: u16) -> io::Result<TcpStream> {
    let stream = TcpStream::connect((host, port))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
