//! Torus Life evolution server.
//!
//! Accepts one evolution request per connection and replies with the
//! completed run. Stateless across calls.

use std::net::TcpListener;

use torus_life::remote::serve;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let port: u16 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(8030);

    let listener = TcpListener::bind(("0.0.0.0", port)).unwrap_or_else(|e| {
        eprintln!("Error binding port {}: {}", port, e);
        std::process::exit(1);
    });

    println!("Torus Life evolution server on port {port}");

    if let Err(e) = serve(listener) {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
