//! The response/CGI collaborator seam (§6). Turning a parsed request plus
//! the servers sharing the listener it arrived on into response bytes is
//! explicitly out of scope here; this trait is the boundary a response
//! pipeline implements against. `PlaceholderRouter` is the minimal stand-in
//! wired into the event loop so the accept path has something to call.

use crate::config::server::Server;
use crate::http::HttpRequest;

pub trait Router {
    /// `servers` holds every virtual server sharing the fd the connection
    /// was accepted on; picking the right one (by `Host`, by default) is
    /// the collaborator's job.
    fn route(&self, servers: &[&Server], request: &HttpRequest) -> Vec<u8>;

    /// Called when the accepted bytes did not parse as a request at all.
    fn route_parse_error(&self, servers: &[&Server]) -> Vec<u8> {
        let _ = servers;
        b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec()
    }
}

/// Answers every request with `501 Not Implemented`. Stands in until a real
/// response pipeline is wired in.
pub struct PlaceholderRouter;

impl Router for PlaceholderRouter {
    fn route(&self, _servers: &[&Server], _request: &HttpRequest) -> Vec<u8> {
        b"HTTP/1.1 501 Not Implemented\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec()
    }
}
