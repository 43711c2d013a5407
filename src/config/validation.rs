//! Semantic validator: cross-directive invariants that can only be checked
//! once a server block (or a location within it) has been fully parsed.

use crate::config::server::Server;
use crate::config::server::Location;
use crate::error::{ConfigSemanticError, WebservError};
use crate::utils;
use std::collections::HashSet;

const INVALID_PATH_CHARS: &[char] = &['*', '?', '<', '>', '|', '"', '\\', '\0'];

/// Runs once a `location { … }` block has finished parsing: CGI coherence
/// for `/cgi-bin`, or path/index/return/alias readability otherwise.
pub fn validate_location(location: &Location, server: &Server) -> Result<(), WebservError> {
    if location.is_cgi_bin() {
        validate_cgi_location(location)
    } else {
        validate_static_location(location, server)
    }
}

fn validate_cgi_location(location: &Location) -> Result<(), WebservError> {
    if location.cgi_exec_path.is_empty() || location.cgi_ext.is_empty() || location.index.is_none() {
        return Err(ConfigSemanticError::CgiValidationFailed.into());
    }
    let index = location.index.as_deref().unwrap_or_default();
    if !cgi_index_is_readable(location, index) {
        return Err(ConfigSemanticError::CgiValidationFailed.into());
    }
    if location.cgi_exec_path.len() != location.cgi_ext.len() {
        return Err(ConfigSemanticError::CgiValidationFailed.into());
    }
    for exec_path in &location.cgi_exec_path {
        if utils::get_path_type(exec_path) == utils::PathType::Missing {
            return Err(ConfigSemanticError::CgiValidationFailed.into());
        }
    }
    for ext in &location.cgi_ext {
        if !matches!(ext.as_str(), ".py" | ".sh" | "*.py" | "*.sh") {
            return Err(ConfigSemanticError::CgiValidationFailed.into());
        }
    }
    Ok(())
}

/// Builds the `extension -> interpreter` mapping once CGI coherence has
/// been confirmed; kept separate from `validate_cgi_location` because it
/// mutates the location rather than merely checking it.
pub fn build_cgi_interpreter_map(location: &mut Location) {
    for ext in location.cgi_ext.clone() {
        let (needle, key) = if ext == ".py" || ext == "*.py" {
            ("python", ".py")
        } else {
            ("bash", ".sh")
        };
        if let Some(path) = location.cgi_exec_path.iter().find(|p| p.contains(needle)) {
            location.cgi_interpreters.insert(key.to_string(), path.clone());
        }
    }
}

fn cgi_index_is_readable(location: &Location, index: &str) -> bool {
    if utils::is_readable_file(index) {
        return true;
    }
    let root = location.root.as_deref().unwrap_or("");
    let candidate = format!("{root}{}/{index}", location.path);
    if utils::is_readable_file(&candidate) {
        return true;
    }
    if let Ok(cwd) = std::env::current_dir() {
        let cwd = cwd.to_string_lossy();
        let candidate = format!("{cwd}{}/{index}", location.path);
        return utils::is_readable_file(&candidate);
    }
    false
}

fn validate_static_location(location: &Location, server: &Server) -> Result<(), WebservError> {
    if !check_location_path(&location.path) {
        return Err(ConfigSemanticError::InvalidLocationPath(location.path.clone()).into());
    }
    let root = location.root.as_deref().unwrap_or_else(|| server.effective_root());
    let index = location.index.as_deref().unwrap_or_else(|| server.effective_index());
    let root_prefix = format!("{root}{}/", location.path);
    if !utils::check_file_is_readable(&root_prefix, index) {
        return Err(ConfigSemanticError::InvalidLocationIndex.into());
    }
    if let Some(ret) = &location.r#return {
        if !ret.is_empty() && !utils::check_file_is_readable(root, ret) {
            return Err(ConfigSemanticError::InvalidLocationReturn.into());
        }
    }
    if let Some(alias) = &location.alias {
        if !alias.is_empty() && !utils::check_file_is_readable(root, alias) {
            return Err(ConfigSemanticError::InvalidLocationAlias.into());
        }
    }
    Ok(())
}

/// `path` must begin with `/`, contain no whitespace, no `//`, and none of
/// `* ? < > | " \ NUL`.
pub fn check_location_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }
    if path.contains(INVALID_PATH_CHARS) {
        return false;
    }
    if path.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    if path.contains("//") {
        return false;
    }
    true
}

/// Every `error_pages[code]` must lie in `[100, 599]`; every non-empty
/// value must resolve under `root` to a readable regular file. Entries
/// still carrying their seeded empty-string default are not checked — the
/// default itself is never meant to be served.
pub fn check_error_pages(server: &Server) -> bool {
    let root = server.effective_root();
    for (&code, path) in &server.error_pages {
        if !(100..=599).contains(&code) {
            return false;
        }
        if path.is_empty() {
            continue;
        }
        let abs_path = format!("{root}{path}");
        if !utils::is_readable_file(&abs_path) {
            return false;
        }
    }
    true
}

/// Finalises a fully-parsed server block: applies defaults, checks index
/// readability, duplicate location paths, error page validity, builds the
/// CGI interpreter maps, and propagates defaults into locations.
pub fn validate_server(server: &mut Server) -> Result<(), WebservError> {
    server.apply_defaults();
    if !utils::check_file_is_readable(server.effective_root(), server.effective_index()) {
        return Err(ConfigSemanticError::UnreadableIndex.into());
    }
    if server.has_duplicate_location_paths() {
        return Err(ConfigSemanticError::DuplicateLocations.into());
    }
    if !check_error_pages(server) {
        return Err(ConfigSemanticError::InvalidErrorPages.into());
    }
    for location in &mut server.locations {
        if location.is_cgi_bin() {
            build_cgi_interpreter_map(location);
        }
    }
    server.propagate_defaults_to_locations();
    Ok(())
}

/// Enforces global uniqueness of the `(host, port, server_name)` triple
/// across every parsed server.
pub fn validate_global_uniqueness(servers: &[Server]) -> Result<(), WebservError> {
    let mut seen: HashSet<(String, u16, String)> = HashSet::new();
    for server in servers {
        for (host, port) in &server.listeners {
            let key = (host.clone(), *port, server.server_name.clone());
            if !seen.insert(key) {
                return Err(ConfigSemanticError::DuplicateListenerTriple.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::server::Location;

    #[test]
    fn location_path_must_start_with_slash() {
        assert!(check_location_path("/images"));
        assert!(!check_location_path("images"));
    }

    #[test]
    fn location_path_rejects_double_slash() {
        assert!(!check_location_path("/images//x"));
    }

    #[test]
    fn location_path_rejects_forbidden_characters() {
        for c in ['*', '?', '<', '>', '|', '"', '\\'] {
            let path = format!("/a{c}b");
            assert!(!check_location_path(&path), "expected {path:?} to be rejected");
        }
    }

    #[test]
    fn location_path_rejects_whitespace() {
        assert!(!check_location_path("/a b"));
    }

    #[test]
    fn cgi_interpreter_map_pairs_extension_to_matching_interpreter() {
        let mut location = Location::new("/cgi-bin".to_string());
        location.cgi_ext = vec![".py".to_string()];
        location.cgi_exec_path = vec!["/usr/bin/python".to_string()];
        build_cgi_interpreter_map(&mut location);
        assert_eq!(
            location.cgi_interpreters.get(".py"),
            Some(&"/usr/bin/python".to_string())
        );
    }

    #[test]
    fn global_uniqueness_allows_shared_listener_different_names() {
        let mut a = Server::new();
        a.server_name = "a.example".to_string();
        a.listeners.push(("127.0.0.1".to_string(), 8080));
        let mut b = Server::new();
        b.server_name = "b.example".to_string();
        b.listeners.push(("127.0.0.1".to_string(), 8080));
        assert!(validate_global_uniqueness(&[a, b]).is_ok());
    }

    #[test]
    fn global_uniqueness_rejects_identical_triple() {
        let mut a = Server::new();
        a.listeners.push(("127.0.0.1".to_string(), 8080));
        let mut b = Server::new();
        b.listeners.push(("127.0.0.1".to_string(), 8080));
        assert!(validate_global_uniqueness(&[a, b]).is_err());
    }
}
