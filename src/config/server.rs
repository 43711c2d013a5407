//! In-memory representation of one virtual server and its route table.
//!
//! Single-assignment guards (`location_seen`, `autoindex_seen`, …) are
//! modeled as the presence of the guarded field itself rather than a
//! parallel `bool` — an `Option<T>` already distinguishes "unset" from
//! "set", so a second assignment is detected by matching on `Some(_)`.

use std::collections::BTreeMap;

pub const DEFAULT_CLIENT_MAX_BODY_SIZE: u64 = 50_000_000;

/// Bitmask over the three methods the server ever routes: GET, POST, DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Methods(u8);

impl Methods {
    pub const GET: Methods = Methods(0b001);
    pub const POST: Methods = Methods(0b010);
    pub const DELETE: Methods = Methods(0b100);

    pub fn empty() -> Self {
        Methods(0)
    }

    pub fn from_tokens(tokens: &[String]) -> Result<Methods, String> {
        let mut mask = Methods::empty();
        for token in tokens {
            let bit = match token.as_str() {
                "GET" => Methods::GET,
                "POST" => Methods::POST,
                "DELETE" => Methods::DELETE,
                other => return Err(other.to_string()),
            };
            mask.0 |= bit.0;
        }
        Ok(mask)
    }

    pub fn contains(&self, m: Methods) -> bool {
        self.0 & m.0 != 0
    }
}

/// One route entry under a server.
#[derive(Debug, Clone, Default)]
pub struct Location {
    pub path: String,
    pub root: Option<String>,
    pub index: Option<String>,
    pub autoindex: Option<bool>,
    pub methods: Option<Methods>,
    pub r#return: Option<String>,
    pub alias: Option<String>,
    pub cgi_exec_path: Vec<String>,
    pub cgi_ext: Vec<String>,
    pub client_max_body_size: Option<u64>,
    /// Derived `extension -> interpreter` mapping, built by the validator
    /// from `cgi_exec_path`/`cgi_ext` — not a directive operand itself.
    pub cgi_interpreters: BTreeMap<String, String>,
}

impl Location {
    pub fn new(path: String) -> Self {
        Location {
            path,
            ..Default::default()
        }
    }

    pub fn is_cgi_bin(&self) -> bool {
        self.path == "/cgi-bin"
    }

    pub fn effective_root<'a>(&'a self, server_root: &'a str) -> &'a str {
        self.root.as_deref().unwrap_or(server_root)
    }

    pub fn effective_index<'a>(&'a self, server_index: &'a str) -> &'a str {
        self.index.as_deref().unwrap_or(server_index)
    }

    pub fn effective_autoindex(&self, server_autoindex: bool) -> bool {
        self.autoindex.unwrap_or(server_autoindex)
    }

    pub fn effective_max_body_size(&self, server_max: u64) -> u64 {
        self.client_max_body_size.unwrap_or(server_max)
    }
}

/// One `server { … }` block.
#[derive(Debug, Clone)]
pub struct Server {
    pub server_name: String,
    pub root: Option<String>,
    pub index: Option<String>,
    pub autoindex: bool,
    pub autoindex_seen: bool,
    pub client_max_body_size: Option<u64>,
    pub maxsize_seen: bool,
    pub error_pages: BTreeMap<u16, String>,
    pub listeners: Vec<(String, u16)>,
    pub locations: Vec<Location>,
    pub location_seen: bool,
    /// Listening file descriptors bound for this server's `listeners`,
    /// populated by the listener binder after validation.
    pub listen_fds: Vec<i32>,
}

impl Default for Server {
    fn default() -> Self {
        let mut error_pages = BTreeMap::new();
        for code in [301, 302, 400, 401, 403, 404, 500, 502, 503, 504] {
            error_pages.insert(code, String::new());
        }
        Server {
            server_name: String::new(),
            root: None,
            index: None,
            autoindex: false,
            autoindex_seen: false,
            client_max_body_size: None,
            maxsize_seen: false,
            error_pages,
            listeners: Vec::new(),
            locations: Vec::new(),
            location_seen: false,
            listen_fds: Vec::new(),
        }
    }
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effective_root(&self) -> &str {
        self.root.as_deref().unwrap_or("/")
    }

    pub fn effective_index(&self) -> &str {
        self.index.as_deref().unwrap_or("index.html")
    }

    pub fn effective_max_body_size(&self) -> u64 {
        self.client_max_body_size.unwrap_or(DEFAULT_CLIENT_MAX_BODY_SIZE)
    }

    pub fn apply_defaults(&mut self) {
        if self.root.is_none() {
            self.root = Some("/".to_string());
        }
        if self.index.is_none() {
            self.index = Some("index.html".to_string());
        }
        if self.listeners.is_empty() {
            self.listeners.push(("127.0.0.1".to_string(), 80));
        }
    }

    /// Propagate server-level root/index/autoindex into any location
    /// whose corresponding field is still unset.
    pub fn propagate_defaults_to_locations(&mut self) {
        let root = self.effective_root().to_string();
        let index = self.effective_index().to_string();
        let autoindex = self.autoindex;
        for loc in &mut self.locations {
            if loc.root.is_none() {
                loc.root = Some(root.clone());
            }
            if loc.autoindex.is_none() {
                loc.autoindex = Some(autoindex);
            }
            if loc.index.is_none() {
                loc.index = Some(index.clone());
            }
        }
    }

    pub fn has_duplicate_location_paths(&self) -> bool {
        for i in 0..self.locations.len() {
            for j in (i + 1)..self.locations.len() {
                if self.locations[i].path == self.locations[j].path {
                    return true;
                }
            }
        }
        false
    }
}
