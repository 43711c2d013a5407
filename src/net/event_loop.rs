//! The readiness-driven event loop (§4.6): a single `select()` call per
//! iteration over every bound listener fd, draining listeners before any
//! client work, with a one-second timeout so the loop can notice signals
//! between iterations.
//!
//! Ported from `Router::runServers`/`initialiseSets`/`addToFdSet`/
//! `removeFromFdSet`/`acceptNewConnection`. The original polls via
//! `select(2)` directly rather than kqueue/epoll, so this replaces the
//! teacher's `EpollServer` rather than adapting it — the multiplex
//! primitive itself changed, not just its backing library.

use crate::config::server::Server;
use crate::error::{SystemError, WebservError};
use crate::net::listener::ListenerTable;
use crate::router::Router;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::os::unix::io::{AsRawFd, RawFd};

const READ_BUFFER_SIZE: usize = 30_000;
const SELECT_TIMEOUT_SECS: libc::time_t = 1;

/// `fd_set` is a fixed 1024-bit bitmap on both Linux and macOS; the `libc`
/// crate exposes the type but not the `FD_SET`/`FD_CLR`/`FD_ISSET`/`FD_ZERO`
/// macros, so the bit manipulation is done by hand here rather than
/// depending on `fd_set`'s private field layout.
#[derive(Clone)]
#[repr(C, align(8))]
struct FdSet([u8; 128]);

impl FdSet {
    fn zero() -> Self {
        FdSet([0u8; 128])
    }

    fn insert(&mut self, fd: RawFd) {
        let fd = fd as usize;
        self.0[fd / 8] |= 1 << (fd % 8);
    }

    fn remove(&mut self, fd: RawFd) {
        let fd = fd as usize;
        self.0[fd / 8] &= !(1 << (fd % 8));
    }

    fn contains(&self, fd: RawFd) -> bool {
        let fd = fd as usize;
        (self.0[fd / 8] >> (fd % 8)) & 1 == 1
    }

    fn as_mut_ptr(&mut self) -> *mut libc::fd_set {
        &mut self.0 as *mut [u8; 128] as *mut libc::fd_set
    }
}

pub struct EventLoop<R: Router> {
    listeners: HashMap<RawFd, TcpListener>,
    fd_to_servers: HashMap<RawFd, Vec<usize>>,
    servers: Vec<Server>,
    router: R,
    read_set: FdSet,
    biggest_fd: RawFd,
}

impl<R: Router> EventLoop<R> {
    pub fn new(table: ListenerTable, servers: Vec<Server>, router: R) -> Self {
        EventLoop {
            listeners: table.listeners,
            fd_to_servers: table.fd_to_servers,
            servers,
            router,
            read_set: FdSet::zero(),
            biggest_fd: 0,
        }
    }

    /// Marks every listener non-blocking and seeds the read set, mirroring
    /// `initialiseSets`.
    fn initialise_sets(&mut self) -> Result<(), WebservError> {
        self.read_set = FdSet::zero();
        self.biggest_fd = 0;
        for (&fd, listener) in self.listeners.iter() {
            listener.set_nonblocking(true).map_err(SystemError::Listen)?;
            self.add_to_read_set(fd);
        }
        Ok(())
    }

    fn add_to_read_set(&mut self, fd: RawFd) {
        self.read_set.insert(fd);
        if fd > self.biggest_fd {
            self.biggest_fd = fd;
        }
    }

    fn remove_from_read_set(&mut self, fd: RawFd) {
        self.read_set.remove(fd);
    }

    /// Runs until a `select` failure or a signal handler terminates the
    /// process. One second of idle timeout per iteration lets SIGINT land
    /// between polls without requiring a self-pipe.
    pub fn run(&mut self) -> Result<(), WebservError> {
        self.initialise_sets()?;
        loop {
            let mut ready = self.read_set.clone();
            let mut timeout = libc::timeval {
                tv_sec: SELECT_TIMEOUT_SECS,
                tv_usec: 0,
            };

            let ready_count = unsafe {
                libc::select(
                    self.biggest_fd + 1,
                    ready.as_mut_ptr(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    &mut timeout,
                )
            };

            if ready_count < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(SystemError::Select(err).into());
            }
            if ready_count == 0 {
                continue;
            }

            let listener_fds: Vec<RawFd> = self.listeners.keys().copied().collect();
            for fd in listener_fds {
                if ready.contains(fd) {
                    self.accept_new_connection(fd);
                }
            }
        }
    }

    /// Accepts one connection off `listen_fd`, reads a bounded request
    /// buffer, parses and routes it synchronously, writes the response,
    /// and closes — there is no persistent per-connection state, matching
    /// the complete-buffer request model in §4.7.
    fn accept_new_connection(&mut self, listen_fd: RawFd) {
        let accepted = match self.listeners.get(&listen_fd) {
            Some(listener) => listener.accept(),
            None => return,
        };

        let (mut stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(err) => {
                log::warn!("accept failed on fd {listen_fd}: {err}");
                return;
            }
        };

        let client_fd = stream.as_raw_fd();
        self.add_to_read_set(client_fd);
        log::debug!("accepted connection from {peer} on fd {client_fd}");

        if let Err(err) = self.service_connection(&mut stream, listen_fd) {
            log::warn!("connection on fd {client_fd} failed: {err}");
        }

        self.remove_from_read_set(client_fd);
    }

    fn service_connection(&self, stream: &mut std::net::TcpStream, listen_fd: RawFd) -> io::Result<()> {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }

        let indices = self.fd_to_servers.get(&listen_fd).cloned().unwrap_or_default();
        let servers: Vec<&Server> = indices.iter().map(|&i| &self.servers[i]).collect();

        let response = match crate::http::parse_request(&buf[..n]) {
            Ok(request) => self.router.route(&servers, &request),
            Err(err) => {
                log::warn!("request parse error on fd {}: {err}", listen_fd);
                self.router.route_parse_error(&servers)
            }
        };

        stream.write_all(&response)?;
        Ok(())
    }
}
