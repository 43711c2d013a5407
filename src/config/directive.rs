//! Directive dispatch: maps a keyword to the handler that consumes its
//! operand tokens and mutates the `Server`/`Location` under construction.
//!
//! The original project keys a member-function-pointer table by keyword;
//! here the "enumerated variant" option from the design notes is used
//! instead — a `match` over the keyword string picks the handler function
//! directly, since Rust gives us exhaustiveness checking on the `match`
//! without needing a runtime table at all.

use crate::config::server::{Location, Server};
use crate::error::{ConfigParseError, ConfigSemanticError, WebservError};
use crate::utils;

const SERVER_DIRECTIVES: &[&str] = &[
    "root",
    "listen",
    "location",
    "autoindex",
    "index",
    "error_page",
    "client_max_body_size",
    "server_name",
];

const LOCATION_DIRECTIVES: &[&str] = &[
    "root",
    "allow_methods",
    "methods",
    "autoindex",
    "index",
    "return",
    "alias",
    "cgi_ext",
    "cgi_exec_path",
    "client_max_body_size",
];

pub fn is_server_directive(keyword: &str) -> bool {
    SERVER_DIRECTIVES.contains(&keyword)
}

pub fn is_location_directive(keyword: &str) -> bool {
    LOCATION_DIRECTIVES.contains(&keyword)
}

/// Parses a whole server block's token stream, dispatching each directive
/// in turn. `tokens` excludes the enclosing `{`/`}`? No — it still contains
/// them, exactly as the original passes the braces through so that
/// `location`'s handler can see them as delimiters.
pub fn parse_server_block(tokens: &[String], server: &mut Server) -> Result<(), WebservError> {
    let mut i = 0;
    while i < tokens.len() {
        let keyword = tokens[i].as_str();
        if is_server_directive(keyword) {
            if i == tokens.len() - 1 {
                return Err(ConfigParseError::MissingValue(keyword.to_string()).into());
            }
            dispatch_server_directive(keyword, &mut i, server, tokens)?;
        } else if keyword != "}" && keyword != "{" {
            if server.location_seen {
                return Err(ConfigParseError::ParametersAfterLocation.into());
            }
            return Err(ConfigParseError::UnsupportedDirective(keyword.to_string()).into());
        }
        i += 1;
    }
    Ok(())
}

fn dispatch_server_directive(
    keyword: &str,
    i: &mut usize,
    server: &mut Server,
    tokens: &[String],
) -> Result<(), WebservError> {
    match keyword {
        "root" => handle_root(i, server, tokens),
        "listen" => handle_listen(i, server, tokens),
        "location" => handle_location(i, server, tokens),
        "autoindex" => handle_autoindex(i, server, tokens),
        "index" => handle_index(i, server, tokens),
        "error_page" => handle_error_page(i, server, tokens),
        "client_max_body_size" => handle_client_max_body_size(i, server, tokens),
        "server_name" => handle_server_name(i, server, tokens),
        _ => unreachable!("dispatch only called for recognised server directives"),
    }
}

fn require_no_location(server: &Server) -> Result<(), WebservError> {
    if server.location_seen {
        Err(ConfigParseError::ParametersAfterLocation.into())
    } else {
        Ok(())
    }
}

fn final_token<'a>(raw: &'a str) -> Result<&'a str, WebservError> {
    utils::check_final_token(raw).map_err(|_| ConfigParseError::MissingTerminator.into())
}

fn handle_root(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    if server.root.is_some() {
        return Err(ConfigSemanticError::RootDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    let resolved = resolve_server_root(token)?;
    server.root = Some(resolved);
    Ok(())
}

/// If `root` is already a directory, keep it as-is; otherwise retry as
/// `cwd + root`, matching the original's fallback before giving up.
fn resolve_server_root(root: &str) -> Result<String, WebservError> {
    if utils::get_path_type(root) == utils::PathType::Directory {
        return Ok(root.to_string());
    }
    let cwd = std::env::current_dir().map_err(WebservError::Io)?;
    let candidate = cwd.join(root.trim_start_matches('/'));
    let candidate_str = candidate.to_string_lossy().to_string();
    if utils::get_path_type(&candidate_str) != utils::PathType::Directory {
        return Err(ConfigSemanticError::InvalidRoot(root.to_string()).into());
    }
    Ok(candidate_str)
}

fn handle_listen(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    *i += 1;
    let token = final_token(&tokens[*i])?;
    let (host, port) = parse_listen_operand(token)?;
    server.listeners.push((host, port));
    Ok(())
}

/// Parses the `listen` operand per §4.3: `HOST:PORT`, a bare host, or a
/// bare port, with `localhost` rewritten to the loopback address.
fn parse_listen_operand(raw: &str) -> Result<(String, u16), WebservError> {
    if let Some(colon) = raw.find(':') {
        let mut host = raw[..colon].to_string();
        if host == "localhost" {
            host = "127.0.0.1".to_string();
        }
        let port_str = &raw[colon + 1..];
        let port: i64 = port_str
            .parse()
            .map_err(|_| ConfigSemanticError::InvalidPort(port_str.to_string()))?;
        if !utils::is_valid_port(port) {
            return Err(ConfigSemanticError::InvalidPort(port_str.to_string()).into());
        }
        if !(utils::is_valid_ipv4(&host) && (utils::is_private_ipv4(&host) || utils::is_loopback_ipv4(&host))) {
            return Err(ConfigSemanticError::InvalidHost(host).into());
        }
        Ok((host, port as u16))
    } else if utils::is_valid_ipv4(raw) && (utils::is_private_ipv4(raw) || utils::is_loopback_ipv4(raw)) {
        Ok((raw.to_string(), 80))
    } else {
        let port = utils::ft_stoi(raw).map_err(|_| ConfigSemanticError::InvalidPort(raw.to_string()))?;
        if utils::is_valid_port(port) {
            Ok(("127.0.0.1".to_string(), port as u16))
        } else {
            Err(ConfigSemanticError::InvalidPort(raw.to_string()).into())
        }
    }
}

fn handle_server_name(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    *i += 1;
    let token = final_token(&tokens[*i])?;
    require_no_location(server)?;
    if !server.server_name.is_empty() {
        return Err(ConfigSemanticError::ServerNameDuplicated.into());
    }
    server.server_name = token.to_string();
    Ok(())
}

fn handle_index(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    if server.index.is_some() {
        return Err(ConfigSemanticError::IndexDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    server.index = Some(token.to_string());
    Ok(())
}

fn handle_autoindex(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    if server.autoindex_seen {
        return Err(ConfigSemanticError::AutoindexDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    server.autoindex = parse_on_off(token).map_err(ConfigSemanticError::InvalidAutoindex)?;
    server.autoindex_seen = true;
    Ok(())
}

fn parse_on_off(flag: &str) -> Result<bool, String> {
    match flag {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(other.to_string()),
    }
}

fn handle_client_max_body_size(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    if server.maxsize_seen {
        return Err(ConfigSemanticError::MaxBodySizeDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    server.client_max_body_size = Some(parse_body_size(token)?);
    server.maxsize_seen = true;
    Ok(())
}

fn parse_body_size(token: &str) -> Result<u64, WebservError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigSemanticError::InvalidMaxBodySize(token.to_string()).into());
    }
    let value: u64 = token
        .parse()
        .map_err(|_| ConfigSemanticError::InvalidMaxBodySize(token.to_string()))?;
    if value == 0 {
        return Err(ConfigSemanticError::InvalidMaxBodySize(token.to_string()).into());
    }
    Ok(value)
}

fn handle_error_page(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    require_no_location(server)?;
    let mut operands = Vec::new();
    loop {
        *i += 1;
        if *i >= tokens.len() {
            return Err(ConfigParseError::WrongScopeCharacter.into());
        }
        operands.push(tokens[*i].clone());
        if tokens[*i].contains(';') {
            break;
        }
        if *i + 1 >= tokens.len() {
            return Err(ConfigParseError::WrongScopeCharacter.into());
        }
    }
    set_error_pages(server, &operands)
}

fn set_error_pages(server: &mut Server, operands: &[String]) -> Result<(), WebservError> {
    if operands.is_empty() {
        return Ok(());
    }
    if operands.len() % 2 != 0 {
        return Err(ConfigSemanticError::OddErrorPageList.into());
    }
    let mut i = 0;
    while i < operands.len() {
        let code_str = &operands[i];
        if code_str.len() != 3 || !code_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigSemanticError::InvalidErrorCode(code_str.clone()).into());
        }
        let code: u16 = code_str
            .parse()
            .map_err(|_| ConfigSemanticError::InvalidErrorCode(code_str.clone()))?;
        if utils::status_code_string(code).is_none() || code < 400 {
            return Err(ConfigSemanticError::InvalidErrorCode(code_str.clone()).into());
        }
        let path_token = final_token(&operands[i + 1])?;
        if utils::get_path_type(path_token) == utils::PathType::Directory {
            return Err(ConfigSemanticError::InvalidErrorPagePath(path_token.to_string()).into());
        }
        let abs_path = format!("{}{}", server.effective_root(), path_token);
        if !utils::is_readable_file(&abs_path) {
            return Err(ConfigSemanticError::InvalidErrorPagePath(abs_path).into());
        }
        server.error_pages.insert(code, path_token.to_string());
        i += 2;
    }
    Ok(())
}

/// `location PATH { … }`. Harvests tokens up to (but not including) the
/// matching `}`, dispatches them through the location-level directive
/// table, and appends the resulting `Location` to the server.
fn handle_location(i: &mut usize, server: &mut Server, tokens: &[String]) -> Result<(), WebservError> {
    if !server.location_seen {
        server.location_seen = true;
        server.apply_defaults();
    }
    *i += 1;
    if *i >= tokens.len() || tokens[*i] == "{" || tokens[*i] == "}" {
        return Err(ConfigParseError::WrongScopeCharacter.into());
    }
    let path = tokens[*i].clone();
    *i += 1;
    if *i >= tokens.len() || tokens[*i] != "{" {
        return Err(ConfigParseError::WrongScopeCharacter.into());
    }
    *i += 1;
    let mut body = Vec::new();
    while *i < tokens.len() && tokens[*i] != "}" {
        body.push(tokens[*i].clone());
        *i += 1;
    }
    if *i >= tokens.len() || tokens[*i] != "}" {
        return Err(ConfigParseError::WrongScopeCharacter.into());
    }
    let mut location = parse_location_block(path, &body, server)?;
    if !location.is_cgi_bin() && location.index.is_none() {
        location.index = Some(server.effective_index().to_string());
    }
    crate::config::validation::validate_location(&location, server)?;
    server.locations.push(location);
    Ok(())
}

fn parse_location_block(path: String, tokens: &[String], server: &Server) -> Result<Location, WebservError> {
    let mut location = Location::new(path);
    let mut i = 0;
    while i < tokens.len() {
        let keyword = tokens[i].as_str();
        if is_location_directive(keyword) {
            if i == tokens.len() - 1 {
                return Err(ConfigParseError::MissingValue(keyword.to_string()).into());
            }
            dispatch_location_directive(keyword, &mut i, &mut location, tokens, server)?;
        } else {
            return Err(ConfigParseError::InvalidLocationDirective(keyword.to_string()).into());
        }
        i += 1;
    }
    Ok(location)
}

fn dispatch_location_directive(
    keyword: &str,
    i: &mut usize,
    location: &mut Location,
    tokens: &[String],
    server: &Server,
) -> Result<(), WebservError> {
    match keyword {
        "root" => handle_location_root(i, location, tokens, server),
        "allow_methods" | "methods" => handle_location_methods(i, location, tokens),
        "autoindex" => handle_location_autoindex(i, location, tokens),
        "index" => handle_location_index(i, location, tokens),
        "alias" => handle_location_alias(i, location, tokens),
        "return" => handle_location_return(i, location, tokens),
        "cgi_ext" => handle_location_cgi_ext(i, location, tokens),
        "cgi_exec_path" => handle_location_cgi_path(i, location, tokens),
        "client_max_body_size" => handle_location_max_body_size(i, location, tokens),
        _ => unreachable!("dispatch only called for recognised location directives"),
    }
}

fn handle_location_root(
    i: &mut usize,
    location: &mut Location,
    tokens: &[String],
    server: &Server,
) -> Result<(), WebservError> {
    if location.root.is_some() {
        return Err(ConfigSemanticError::LocationRootDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    if utils::get_path_type(token) == utils::PathType::Directory {
        location.root = Some(token.to_string());
    } else {
        location.root = Some(format!("{}{}", server.effective_root(), token));
    }
    Ok(())
}

fn accumulate_multi_valued(i: &mut usize, tokens: &[String]) -> Result<Vec<String>, WebservError> {
    let mut values = Vec::new();
    loop {
        *i += 1;
        if *i >= tokens.len() {
            return Err(ConfigParseError::InvalidToken.into());
        }
        if tokens[*i].contains(';') {
            let token = final_token(&tokens[*i])?;
            values.push(token.to_string());
            break;
        }
        values.push(tokens[*i].clone());
        if *i + 1 >= tokens.len() {
            return Err(ConfigParseError::InvalidToken.into());
        }
    }
    Ok(values)
}

fn handle_location_methods(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if location.methods.is_some() {
        return Err(ConfigSemanticError::LocationMethodsDuplicated.into());
    }
    let methods = accumulate_multi_valued(i, tokens)?;
    let mask = crate::config::server::Methods::from_tokens(&methods)
        .map_err(ConfigSemanticError::InvalidMethod)?;
    location.methods = Some(mask);
    Ok(())
}

fn handle_location_autoindex(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if location.is_cgi_bin() {
        return Err(ConfigSemanticError::CgiAutoindexNotAllowed.into());
    }
    if location.autoindex.is_some() {
        return Err(ConfigSemanticError::LocationAutoindexDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    location.autoindex = Some(parse_on_off(token).map_err(ConfigSemanticError::InvalidAutoindex)?);
    Ok(())
}

fn handle_location_index(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if location.index.is_some() {
        return Err(ConfigSemanticError::LocationIndexDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    location.index = Some(token.to_string());
    Ok(())
}

fn handle_location_alias(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if location.is_cgi_bin() {
        return Err(ConfigSemanticError::CgiAliasNotAllowed.into());
    }
    if location.alias.is_some() {
        return Err(ConfigSemanticError::LocationAliasDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    location.alias = Some(token.to_string());
    Ok(())
}

fn handle_location_return(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if location.is_cgi_bin() {
        return Err(ConfigSemanticError::CgiReturnNotAllowed.into());
    }
    if location.r#return.is_some() {
        return Err(ConfigSemanticError::LocationReturnDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    location.r#return = Some(token.to_string());
    Ok(())
}

fn handle_location_cgi_ext(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if !location.is_cgi_bin() {
        return Err(ConfigSemanticError::CgiExtOutsideCgiBin.into());
    }
    location.cgi_ext = accumulate_multi_valued(i, tokens)?;
    Ok(())
}

/// Each exec path must name an interpreter (`python` or `bash` as a
/// substring). The original only enforces this for every token except the
/// one terminated by `;`, a quirk of its `break`-before-check control flow;
/// this implementation checks every token, matching the invariant in the
/// data model (§3) literally rather than reproducing that omission.
fn handle_location_cgi_path(i: &mut usize, location: &mut Location, tokens: &[String]) -> Result<(), WebservError> {
    if !location.is_cgi_bin() {
        return Err(ConfigSemanticError::CgiPathOutsideCgiBin.into());
    }
    let paths = accumulate_multi_valued(i, tokens)?;
    for path in &paths {
        if !path.contains("python") && !path.contains("bash") {
            return Err(ConfigSemanticError::InvalidCgiPath.into());
        }
    }
    location.cgi_exec_path = paths;
    Ok(())
}

fn handle_location_max_body_size(
    i: &mut usize,
    location: &mut Location,
    tokens: &[String],
) -> Result<(), WebservError> {
    if location.client_max_body_size.is_some() {
        return Err(ConfigSemanticError::LocationMaxBodySizeDuplicated.into());
    }
    *i += 1;
    let token = final_token(&tokens[*i])?;
    location.client_max_body_size = Some(parse_body_size(token)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tokenizer::{normalise_spaces, tokenize};

    fn tokenize_block(src: &str) -> Vec<String> {
        tokenize(&normalise_spaces(src))
    }

    #[test]
    fn listen_host_port_pair() {
        let (host, port) = parse_listen_operand("127.0.0.1:8080").unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn listen_bare_port_defaults_host() {
        let (host, port) = parse_listen_operand("8080").unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn listen_bare_host_defaults_port_80() {
        let (host, port) = parse_listen_operand("10.0.0.1").unwrap();
        assert_eq!(host, "10.0.0.1");
        assert_eq!(port, 80);
    }

    #[test]
    fn listen_rewrites_localhost() {
        let (host, _) = parse_listen_operand("localhost:8080").unwrap();
        assert_eq!(host, "127.0.0.1");
    }

    #[test]
    fn listen_rejects_public_host() {
        assert!(parse_listen_operand("8.8.8.8:80").is_err());
    }

    #[test]
    fn duplicate_root_is_rejected() {
        let tokens = tokenize_block("{ root /tmp; root /tmp; }");
        let mut server = Server::new();
        let err = parse_server_block(&tokens, &mut server).unwrap_err();
        assert!(matches!(
            err,
            WebservError::Semantic(ConfigSemanticError::RootDuplicated)
        ));
    }

    #[test]
    fn error_page_odd_operand_count_is_rejected() {
        let tokens = tokenize_block("{ root /tmp; error_page 404 500 /e.html; }");
        let mut server = Server::new();
        let err = parse_server_block(&tokens, &mut server).unwrap_err();
        assert!(matches!(
            err,
            WebservError::Semantic(ConfigSemanticError::OddErrorPageList)
        ));
    }
}
