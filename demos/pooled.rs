//! Pooled sessions - several users over one connection per array.
//!
//! This example demonstrates:
//! - Loading connection settings from a JSON file
//! - Sharing a pooled session between users
//! - Flushing sessions past their TTL
//!
//! # Running
//!
//! ```sh
//! cat > xcli.json <<EOF
//! { "tls": true, "timeout_secs": 10, "pool_ttl_secs": 300 }
//! EOF
//! RUST_LOG=debug cargo run --example pooled -- xcli.json array-a.example.com
//! ```

use std::thread;

use xcli_client::transport::Endpoint;
use xcli_client::{Arguments, ClientConfig, Executor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    let endpoints = args
        .map(|endpoint| endpoint.parse::<Endpoint>())
        .collect::<Result<Vec<_>, _>>()?;

    let pool = config.into_pool();
    let users = [("admin", "secret"), ("operator", "op-pass")];

    thread::scope(|scope| {
        for (user, password) in users {
            let pool = &pool;
            let endpoints = &endpoints;
            scope.spawn(move || {
                let result = pool.get(user, password, endpoints).and_then(|client| {
                    client.execute("vol_list", &Arguments::new())?.len()
                });
                match result {
                    Ok(count) => println!("{}: {} volumes", user, count),
                    Err(err) => eprintln!("{}: {}", user, err),
                }
            });
        }
    });

    println!("flushed {} stale entries", pool.flush());
    pool.clear();
    Ok(())
}
