use webserv::net::event_loop::EventLoop;
use webserv::net::listener::bind_listeners;
use webserv::router::PlaceholderRouter;
use webserv::{cli, config, logging};
use std::process;

extern "C" fn handle_sigint(signum: libc::c_int) {
    process::exit(signum);
}

/// Installs SIGINT/SIGPIPE handling once, before the event loop starts.
/// A broken client pipe must not tear down the whole process, so SIGPIPE
/// is ignored; SIGINT exits with the signal number.
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

fn main() {
    let args = cli::Cli::parse_args();
    logging::init();

    let mut servers = match config::load(&args.config_path) {
        Ok(servers) => servers,
        Err(err) => {
            log::error!("{err}");
            process::exit(1);
        }
    };

    let table = match bind_listeners(&mut servers) {
        Ok(table) => table,
        Err(err) => {
            log::error!("{err}");
            process::exit(1);
        }
    };

    log::info!(
        "bound {} listener(s) across {} server(s) from {}",
        table.listeners.len(),
        servers.len(),
        args.config_path
    );

    install_signal_handlers();

    let mut event_loop = EventLoop::new(table, servers, PlaceholderRouter);
    if let Err(err) = event_loop.run() {
        log::error!("{err}");
        process::exit(1);
    }
}
