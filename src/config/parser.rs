//! Top-level configuration compiler: reads a config file and produces a
//! validated `Vec<Server>`, orchestrating the tokenizer, block splitter,
//! directive dispatcher, and semantic validator in sequence.

use crate::config::directive;
use crate::config::server::Server;
use crate::config::splitter;
use crate::config::tokenizer;
use crate::config::validation;
use crate::error::{ConfigParseError, WebservError};
use crate::utils;
use std::fs;

pub struct ConfigParser {
    servers: Vec<Server>,
}

impl ConfigParser {
    pub fn new() -> Self {
        ConfigParser { servers: Vec::new() }
    }

    /// Reads `config_path`, extracts and parses every `server { … }` block,
    /// validates each one, and enforces global listener-triple uniqueness.
    pub fn extract_server_blocks(&mut self, config_path: &str) -> Result<(), WebservError> {
        if utils::get_path_type(config_path) != utils::PathType::File {
            return Err(ConfigParseError::InvalidBlockStart.into());
        }
        let content = fs::read_to_string(config_path).map_err(WebservError::Io)?;
        let normalised = tokenizer::normalise_and_tokenize(&content)?;
        let blocks = splitter::split_server_blocks(&normalised)?;

        for block in &blocks {
            let tokens = tokenizer::tokenize(block);
            let mut server = Server::new();
            directive::parse_server_block(&tokens, &mut server)?;
            validation::validate_server(&mut server)?;
            self.servers.push(server);
        }
        validation::validate_global_uniqueness(&self.servers)?;
        Ok(())
    }

    pub fn servers(self) -> Vec<Server> {
        self.servers
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry point: loads and validates the config at `path`,
/// returning the frozen server list.
pub fn load(path: &str) -> Result<Vec<Server>, WebservError> {
    let mut parser = ConfigParser::new();
    parser.extract_server_blocks(path)?;
    Ok(parser.servers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(contents: &str) -> (tempfile::NamedTempFile, String) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();
        (file, path)
    }

    #[test]
    fn minimal_server_parses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("i.html"), "hi").unwrap();
        let config = format!(
            "server {{ listen 127.0.0.1:8080; root {}; index i.html; }}",
            dir.path().to_string_lossy()
        );
        let (_file, path) = write_temp_config(&config);
        let servers = load(&path).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].listeners, vec![("127.0.0.1".to_string(), 8080)]);
        assert_eq!(servers[0].error_pages.get(&404), Some(&String::new()));
    }

    #[test]
    fn shared_listener_two_servers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("i.html"), "hi").unwrap();
        let root = dir.path().to_string_lossy();
        let config = format!(
            "server {{ listen 127.0.0.1:8080; root {root}; index i.html; server_name a; }}\n\
             server {{ listen 127.0.0.1:8080; root {root}; index i.html; server_name b; }}"
        );
        let (_file, path) = write_temp_config(&config);
        let servers = load(&path).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].listeners[0], servers[1].listeners[0]);
    }
}
