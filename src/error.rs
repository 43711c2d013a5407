//! Domain-tagged error types for the configuration compiler, the request
//! parser, and the listener multiplexer.
//!
//! Each variant corresponds to one of the four error kinds the server
//! distinguishes when deciding whether to abort startup, log and continue,
//! or hand the failure to the response pipeline.

use std::io;
use thiserror::Error;

/// Structural failures while tokenizing or splitting the configuration file.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    #[error("No server block found")]
    NoServerBlock,
    #[error("Invalid characters or nothing found for start of server block")]
    InvalidBlockStart,
    #[error("Missing '{{' for start of server block")]
    MissingBraceOpen,
    #[error("Dangling '{{' found in server block")]
    DanglingBrace,
    #[error("Invalid Scope for Server Block")]
    InvalidScope,
    #[error("Unsupported directive: {0}")]
    UnsupportedDirective(String),
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("parameters after location")]
    ParametersAfterLocation,
    #[error("Invalid Token: Missing ';'")]
    MissingTerminator,
    #[error("Wrong character in server scope{{}}")]
    WrongScopeCharacter,
    #[error("Invalid parameters for location: {0}")]
    InvalidLocationDirective(String),
    #[error("Token is invalid")]
    InvalidToken,
}

/// Semantic failures once a block has been fully tokenized and dispatched.
#[derive(Debug, Error)]
pub enum ConfigSemanticError {
    #[error("Root is duplicated")]
    RootDuplicated,
    #[error("Index is duplicated")]
    IndexDuplicated,
    #[error("Server_name is duplicated")]
    ServerNameDuplicated,
    #[error("Autoindex of server is duplicated")]
    AutoindexDuplicated,
    #[error("Client_max_body_size is duplicated")]
    MaxBodySizeDuplicated,
    #[error("Invalid Root for server: {0}")]
    InvalidRoot(String),
    #[error("Invalid autoindex for server: {0}")]
    InvalidAutoindex(String),
    #[error("Invalid client_max_body_size: {0}")]
    InvalidMaxBodySize(String),
    #[error("Invalid host: {0}")]
    InvalidHost(String),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Error page initialization failed")]
    OddErrorPageList,
    #[error("Incorrect error code: {0}")]
    InvalidErrorCode(String),
    #[error("Incorrect path for error page file: {0}")]
    InvalidErrorPagePath(String),
    #[error("Index from config file not found or unreadable")]
    UnreadableIndex,
    #[error("Duplicate locations in server configuration")]
    DuplicateLocations,
    #[error("Invalid error pages in server configuration")]
    InvalidErrorPages,
    #[error("Invalid path for location: {0}")]
    InvalidLocationPath(String),
    #[error("Invalid Index for location")]
    InvalidLocationIndex,
    #[error("Invalid Return for location")]
    InvalidLocationReturn,
    #[error("Invalid Alias for location")]
    InvalidLocationAlias,
    #[error("Invalid Root for location: {0}")]
    InvalidLocationRoot(String),
    #[error("Invalid Allow Method for location: {0}")]
    InvalidMethod(String),
    #[error("Root of location is duplicated")]
    LocationRootDuplicated,
    #[error("Index of location is duplicated")]
    LocationIndexDuplicated,
    #[error("Autoindex of location is duplicated")]
    LocationAutoindexDuplicated,
    #[error("Alias of location is duplicated")]
    LocationAliasDuplicated,
    #[error("Return of location is duplicated")]
    LocationReturnDuplicated,
    #[error("Allow_methods of location is duplicated")]
    LocationMethodsDuplicated,
    #[error("Maxbody_size of location is duplicated")]
    LocationMaxBodySizeDuplicated,
    #[error("parameters autoindex not allow for CGI")]
    CgiAutoindexNotAllowed,
    #[error("parameters alias not allow for CGI")]
    CgiAliasNotAllowed,
    #[error("parameters return not allow for CGI")]
    CgiReturnNotAllowed,
    #[error("parameters cgi_ext only allowed for /cgi-bin")]
    CgiExtOutsideCgiBin,
    #[error("parameters cgi_exec_path only allowed for /cgi-bin")]
    CgiPathOutsideCgiBin,
    #[error("cgi_path is invalid")]
    InvalidCgiPath,
    #[error("Failed CGI validation")]
    CgiValidationFailed,
    #[error("Duplicate Host, Port and Server Name found")]
    DuplicateListenerTriple,
}

/// Structural failures decoding a raw HTTP/1.1 message.
#[derive(Debug, Error)]
pub enum RequestParseError {
    #[error("Headers do not exist")]
    HeadersDoNotExist,
    #[error("field-line separator not found after headers")]
    MissingFieldLineSeparator,
    #[error("request-line did not split into exactly three tokens")]
    RequestLineError,
}

/// Failures from a syscall performed while binding listeners or servicing
/// the event loop.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("socket error: {0}")]
    Socket(#[source] io::Error),
    #[error("bind error: {0}")]
    Bind(#[source] io::Error),
    #[error("listen error: {0}")]
    Listen(#[source] io::Error),
    #[error("select error: {0}")]
    Select(#[source] io::Error),
    #[error("accept error: {0}")]
    Accept(#[source] io::Error),
}

/// Top-level error unifying all four kinds for `main`'s exit-code mapping.
#[derive(Debug, Error)]
pub enum WebservError {
    #[error("Config Parser Error: {0}")]
    Parse(#[from] ConfigParseError),
    #[error("Server Config Error: {0}")]
    Semantic(#[from] ConfigSemanticError),
    #[error("Request Error: {0}")]
    Request(#[from] RequestParseError),
    #[error("{0}")]
    System(#[from] SystemError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

pub type ConfigResult<T> = Result<T, WebservError>;
