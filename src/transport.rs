//! TCP endpoint for the single downstream peer.
//!
//! [`Listener::accept_one`] consumes the listener, so a second accept is not
//! expressible. The returned [`Session`] keeps the listening socket alive
//! until shutdown and closes the connection before the listener when dropped.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{SendError, StartupError};

/// How often the accept wait re-checks for Ctrl+C and its deadline.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Only one peer is ever served, so only one may queue.
const LISTEN_BACKLOG: i32 = 1;

/// Write one whole message and flush it, classifying failures.
///
/// Broken pipes and resets come back as [`SendError::PeerDisconnected`].
pub fn send_all<W: Write + ?Sized>(sink: &mut W, bytes: &[u8]) -> Result<(), SendError> {
    sink.write_all(bytes)?;
    sink.flush()?;
    Ok(())
}

/// Bound listening socket, not yet connected.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    addr: SocketAddr,
}

impl Listener {
    /// Bind the listening endpoint.
    ///
    /// # Errors
    /// * `StartupError::Bind` - address in use, bad host, or permission denied
    pub fn bind(address: &str) -> Result<Self, StartupError> {
        let bind_error = |source| StartupError::Bind {
            addr: address.to_string(),
            source,
        };
        let mut last_error = None;
        for candidate in address.to_socket_addrs().map_err(bind_error)? {
            match listen_on(candidate) {
                Ok(inner) => {
                    let addr = inner.local_addr().map_err(bind_error)?;
                    log::debug!("Listening on {} (backlog {})", addr, LISTEN_BACKLOG);
                    return Ok(Self { inner, addr });
                }
                Err(e) => {
                    log::debug!("Could not listen on {}: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }
        Err(bind_error(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        })))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the one peer this process will ever serve.
    ///
    /// Returns `Ok(None)` when `should_stop` reports an interrupt before a
    /// peer arrives. With no `timeout` the wait is unbounded.
    ///
    /// # Errors
    /// * `StartupError::Accept` - the OS rejected the accept
    /// * `StartupError::AcceptTimeout` - no peer within `timeout`
    pub fn accept_one(
        self,
        timeout: Option<Duration>,
        should_stop: &dyn Fn() -> bool,
    ) -> Result<Option<Session>, StartupError> {
        let addr = self.addr;
        let accept_error = move |source| StartupError::Accept { addr, source };
        self.inner.set_nonblocking(true).map_err(accept_error)?;
        let deadline = timeout.map(|t| (Instant::now() + t, t));

        let (stream, peer) = loop {
            match self.inner.accept() {
                Ok(accepted) => break accepted,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if should_stop() {
                        return Ok(None);
                    }
                    if let Some((at, timeout)) = deadline {
                        if Instant::now() >= at {
                            return Err(StartupError::AcceptTimeout { addr, timeout });
                        }
                    }
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(accept_error(e)),
            }
        };

        // Accepted sockets inherit non-blocking mode on some platforms.
        stream.set_nonblocking(false).map_err(accept_error)?;
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Could not disable Nagle on peer socket: {}", e);
        }

        Ok(Some(Session {
            connection: Connection { stream, peer },
            listener: self,
        }))
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        log::info!("Listener on {} closed", self.addr);
    }
}

/// The accepted peer stream.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // The peer may already be gone; NotConnected here is expected.
        let _ = self.stream.shutdown(Shutdown::Both);
        log::info!("Connection to {} closed", self.peer);
    }
}

/// Connected peer plus the listener it came from.
///
/// Field order is drop order: connection first, then the listener.
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    listener: Listener,
}

impl Session {
    pub fn peer_addr(&self) -> SocketAddr {
        self.connection.peer_addr()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn connection(&mut self) -> &mut Connection {
        &mut self.connection
    }
}

fn listen_on(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    // Matches std: lets a restarted bridge rebind while the old port sits in TIME_WAIT.
    #[cfg(not(windows))]
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}
