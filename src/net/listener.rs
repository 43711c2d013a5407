//! Listener binder (§4.5): allocates one socket per unique `(host, port)`
//! and shares it across every virtual server that declares that endpoint.
//!
//! Grounded in `Router::setupServers`: a stream socket, `SO_REUSEADDR`,
//! and a bind per unique pair; a fatal log-and-exit on bind failure is
//! left to the caller (`main`), which maps a `SystemError` to exit code 1.

use crate::config::server::Server;
use crate::error::{SystemError, WebservError};
use std::collections::HashMap;
use std::net::TcpListener;
use std::os::unix::io::{AsRawFd, RawFd};

/// The frozen result of binding: a listening fd owns its `TcpListener`, a
/// `(host, port)` pair resolves to the fd that serves it, and an fd
/// resolves to the (stable) indices of every server sharing it. Indices
/// into the caller's server slice are used rather than owned `Server`
/// copies, per the design note on listener-to-server back-references.
pub struct ListenerTable {
    pub listeners: HashMap<RawFd, TcpListener>,
    pub pair_to_fd: HashMap<(String, u16), RawFd>,
    pub fd_to_servers: HashMap<RawFd, Vec<usize>>,
}

impl ListenerTable {
    fn new() -> Self {
        ListenerTable {
            listeners: HashMap::new(),
            pair_to_fd: HashMap::new(),
            fd_to_servers: HashMap::new(),
        }
    }
}

/// Binds every `(host, port)` declared across `servers`, deduplicating
/// shared endpoints, and records the resulting fd on each `Server`.
pub fn bind_listeners(servers: &mut [Server]) -> Result<ListenerTable, WebservError> {
    let mut table = ListenerTable::new();
    for idx in 0..servers.len() {
        let pairs = servers[idx].listeners.clone();
        for (host, port) in pairs {
            let key = (host.clone(), port);
            let fd = if let Some(&existing) = table.pair_to_fd.get(&key) {
                existing
            } else {
                let listener =
                    TcpListener::bind((host.as_str(), port)).map_err(SystemError::Bind)?;
                let fd = listener.as_raw_fd();
                table.pair_to_fd.insert(key, fd);
                table.listeners.insert(fd, listener);
                fd
            };
            servers[idx].listen_fds.push(fd);
            table.fd_to_servers.entry(fd).or_default().push(idx);
        }
    }
    Ok(table)
}
