//! Small standalone helpers shared by the config compiler and the request
//! parser: path classification, IPv4 validation, string splitting.

use std::fs;
use std::path::Path;

/// Classification of a filesystem path, mirroring `stat(2)`'s mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    File,
    Directory,
    Other,
    Missing,
}

pub fn get_path_type(path: &str) -> PathType {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let ft = meta.file_type();
            if ft.is_file() {
                PathType::File
            } else if ft.is_dir() {
                PathType::Directory
            } else {
                PathType::Other
            }
        }
        Err(_) => PathType::Missing,
    }
}

/// True if `path` is a regular file and readable by the current process.
pub fn is_readable_file(path: &str) -> bool {
    if get_path_type(path) != PathType::File {
        return false;
    }
    fs::File::open(path).is_ok()
}

/// Mirrors the original's `checkFileIsReadable(abs_path_part, rel_path)`:
/// accepts either `rel_path` taken alone, or `abs_path_part` joined with
/// `rel_path`, as a readable regular file.
pub fn check_file_is_readable(abs_path_part: &str, rel_path: &str) -> bool {
    let joined = format!("{abs_path_part}{rel_path}");
    is_readable_file(rel_path) || is_readable_file(&joined)
}

/// Splits `s` on every occurrence of `del`, keeping empty tokens (so a
/// trailing delimiter produces a trailing empty string, matching the
/// original's `find`/`substr` loop).
pub fn split_string<'a>(s: &'a str, del: &str) -> Vec<&'a str> {
    if del.is_empty() {
        return vec![s];
    }
    s.split(del).collect()
}

/// Digit-only integer parse with the original's length guard (rejects
/// strings longer than 10 characters, as well as anything non-numeric).
pub fn ft_stoi(s: &str) -> Result<i64, &'static str> {
    if s.len() > 10 {
        return Err("input string length exceeds maximum allowed length");
    }
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err("input contains non-digit characters");
    }
    s.parse::<i64>().map_err(|_| "input contains non-digit characters")
}

/// Validates that `token` ends with exactly one trailing `;`, returning the
/// token with the terminator stripped.
pub fn check_final_token(token: &str) -> Result<&str, &'static str> {
    match token.strip_suffix(';') {
        Some(rest) if !rest.ends_with(';') => Ok(rest),
        _ => Err("Invalid Token: Missing ';'"),
    }
}

/// RFC 1918 private ranges: 10/8, 172.16/12, 192.168/16. Corrects the known
/// bug in the source implementation, which tested `ip[4] in '1'..'3'` after
/// the literal prefix `"172."` — that substring check incorrectly admits
/// `172.0.*`..`172.9.*` in addition to `172.1*.*`. A proper octet-range test
/// is used here instead.
pub fn is_private_ipv4(ip: &str) -> bool {
    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 {
        return false;
    }
    let parsed: Option<Vec<u8>> = octets.iter().map(|o| o.parse::<u8>().ok()).collect();
    let Some(o) = parsed else { return false };
    match (o[0], o[1]) {
        (10, _) => true,
        (192, 168) => true,
        (172, second) => (16..=31).contains(&second),
        _ => false,
    }
}

pub fn is_loopback_ipv4(ip: &str) -> bool {
    ip.starts_with("127.")
}

/// Dotted-quad syntax check: exactly four dot-separated all-digit parts,
/// each in `[0, 255]`.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts.iter().all(|p| {
        !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) && p.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
    })
}

pub fn is_valid_port(port: i64) -> bool {
    (1024..=65535).contains(&port)
}

/// Status line reason phrases for the small set of codes the config
/// compiler cares about (error pages, redirects). Returns `None` for any
/// code outside this table, mirroring the original's `"Undefined"` sentinel.
pub fn status_code_string(code: u16) -> Option<&'static str> {
    Some(match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => return None,
    })
}

/// Resolves the config file path from CLI-style arguments, matching
/// `Utils::getConfigFilePath`: zero positional args selects the default
/// path, more than one is rejected.
pub fn default_config_path() -> &'static str {
    "configs/default.conf"
}

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_ip_excludes_172_0() {
        assert!(!is_private_ipv4("172.0.0.1"));
        assert!(!is_private_ipv4("172.9.1.1"));
        assert!(is_private_ipv4("172.16.0.1"));
        assert!(is_private_ipv4("172.31.255.255"));
        assert!(!is_private_ipv4("172.32.0.1"));
    }

    #[test]
    fn private_ip_10_and_192_168() {
        assert!(is_private_ipv4("10.0.0.1"));
        assert!(is_private_ipv4("192.168.1.1"));
        assert!(!is_private_ipv4("192.169.1.1"));
    }

    #[test]
    fn loopback_prefix() {
        assert!(is_loopback_ipv4("127.0.0.1"));
        assert!(!is_loopback_ipv4("128.0.0.1"));
    }

    #[test]
    fn valid_ip_requires_four_dotted_octets() {
        assert!(is_valid_ipv4("127.0.0.1"));
        assert!(!is_valid_ipv4("127.0.0.1.1"));
        assert!(!is_valid_ipv4("127.0.0.256"));
        assert!(!is_valid_ipv4("127.0.a.1"));
    }

    #[test]
    fn port_boundaries() {
        assert!(!is_valid_port(1023));
        assert!(is_valid_port(1024));
        assert!(is_valid_port(65535));
        assert!(!is_valid_port(65536));
    }

    #[test]
    fn final_token_requires_single_trailing_semicolon() {
        assert_eq!(check_final_token("foo;").unwrap(), "foo");
        assert!(check_final_token("foo").is_err());
        assert!(check_final_token("foo;;").is_err());
    }

    #[test]
    fn stoi_rejects_non_digits_and_overlong_strings() {
        assert_eq!(ft_stoi("123").unwrap(), 123);
        assert!(ft_stoi("12a").is_err());
        assert!(ft_stoi("12345678901").is_err());
    }
}
