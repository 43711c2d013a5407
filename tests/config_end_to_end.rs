//! End-to-end tests driving the config compiler and listener binder
//! together, the way `main` does: write a config file to a temp directory,
//! load it, then bind its listeners.

use std::io::Write;
use webserv::config;
use webserv::http::parse_request;
use webserv::net::listener::bind_listeners;

fn write_config(contents: &str) -> (tempfile::NamedTempFile, String) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    let path = file.path().to_string_lossy().to_string();
    (file, path)
}

#[test]
fn minimal_server_binds_its_declared_listener() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("i.html"), "hi").unwrap();
    let config_text = format!(
        "server {{ listen 127.0.0.1:18080; root {}; index i.html; }}",
        dir.path().to_string_lossy()
    );
    let (_file, path) = write_config(&config_text);

    let mut servers = config::load(&path).unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].listeners, vec![("127.0.0.1".to_string(), 18080)]);
    for code in [301, 302, 400, 401, 403, 404, 500, 502, 503, 504] {
        assert_eq!(servers[0].error_pages.get(&code), Some(&String::new()));
    }

    let table = bind_listeners(&mut servers).unwrap();
    assert_eq!(table.listeners.len(), 1);
    assert_eq!(servers[0].listen_fds.len(), 1);
}

#[test]
fn two_servers_sharing_a_listen_directive_bind_one_socket() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("i.html"), "hi").unwrap();
    let root = dir.path().to_string_lossy();
    let config_text = format!(
        "server {{ listen 127.0.0.1:18081; root {root}; index i.html; server_name a.example; }}\n\
         server {{ listen 127.0.0.1:18081; root {root}; index i.html; server_name b.example; }}"
    );
    let (_file, path) = write_config(&config_text);

    let mut servers = config::load(&path).unwrap();
    assert_eq!(servers.len(), 2);

    let table = bind_listeners(&mut servers).unwrap();
    assert_eq!(table.listeners.len(), 1, "one socket shared across both servers");
    let fd = servers[0].listen_fds[0];
    assert_eq!(servers[1].listen_fds[0], fd);
    assert_eq!(table.fd_to_servers.get(&fd).unwrap().len(), 2);
}

#[test]
fn duplicate_host_port_name_triple_is_rejected_at_load_time() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("i.html"), "hi").unwrap();
    let root = dir.path().to_string_lossy();
    let config_text = format!(
        "server {{ listen 127.0.0.1:18082; root {root}; index i.html; server_name dup.example; }}\n\
         server {{ listen 127.0.0.1:18082; root {root}; index i.html; server_name dup.example; }}"
    );
    let (_file, path) = write_config(&config_text);

    let err = config::load(&path).unwrap_err();
    assert!(err.to_string().contains("Duplicate Host, Port and Server Name"));
}

#[test]
fn cgi_bin_location_builds_extension_interpreter_map() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("i.html"), "hi").unwrap();
    std::fs::create_dir(dir.path().join("cgi-bin")).unwrap();
    std::fs::write(dir.path().join("cgi-bin").join("index.py"), "#!/usr/bin/env python").unwrap();
    let root = dir.path().to_string_lossy();
    let config_text = format!(
        "server {{ listen 127.0.0.1:18083; root {root}; index i.html;\n\
            location /cgi-bin {{ root {root}; index index.py; cgi_ext .py; cgi_exec_path /usr/bin/python3; }}\n\
         }}"
    );
    let (_file, path) = write_config(&config_text);

    let servers = config::load(&path).unwrap();
    assert_eq!(servers.len(), 1);
    let location = &servers[0].locations[0];
    assert_eq!(location.path, "/cgi-bin");
    assert_eq!(
        location.cgi_interpreters.get(".py"),
        Some(&"/usr/bin/python3".to_string())
    );
}

#[test]
fn empty_config_file_has_no_server_block() {
    let (_file, path) = write_config("   # just a comment\n");
    let err = config::load(&path).unwrap_err();
    assert!(err.to_string().contains("No server block found"));
}

#[test]
fn parsed_request_round_trips_through_the_library_boundary() {
    let raw = b"GET /x HTTP/1.1\r\nHost: a\r\n\r\nhello";
    let request = parse_request(raw).unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.target, "/x");
    assert_eq!(request.body, b"hello");
}
