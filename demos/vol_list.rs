//! Volume listing - single session example.
//!
//! This example demonstrates:
//! - Connecting with the builder pattern, over TLS with failover
//! - Running a command and reading its result records
//! - Scoped options and per-user views
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=xcli_client=debug cargo run --example vol_list -- array-a.example.com admin secret
//! ```

use xcli_client::session::{ExecutorExt, OptionOverrides};
use xcli_client::{Arguments, ClientBuilder, Executor, XcliError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().unwrap_or_else(|| "localhost".to_string());
    let user = args.next().unwrap_or_else(|| "admin".to_string());
    let password = args.next().unwrap_or_default();

    let client = ClientBuilder::new()
        .endpoint(&endpoint)
        .credentials(&user, &password)
        .tls(true)
        .multi_endpoint(true)
        .connect()?;

    if let Some(info) = client.command("vol_list") {
        println!("{}\n", info.doc());
    }

    let response = client.execute("vol_list", &Arguments::new())?;
    for volume in response.as_list()? {
        println!(
            "{:<24} {:>8} GB  pool={}",
            volume.field("name").unwrap_or("?"),
            volume.field("size").unwrap_or("?"),
            volume.field("pool_name").unwrap_or("-"),
        );
    }

    // Uncompressed output for a single call.
    let pools = client.with_options(OptionOverrides::new().unset("compress_output"), |scoped| {
        scoped.execute("pool_list", &Arguments::new())
    })?;
    println!("\n{} pools", pools.len()?);

    match client.execute("vol_delete", &Arguments::new().with("vol", "no-such-volume")) {
        Err(XcliError::Command(failure)) => {
            println!("vol_delete failed as expected: {} ({:?})", failure, failure.code)
        }
        Err(err) => return Err(err.into()),
        Ok(_) => println!("volume deleted"),
    }

    client.close();
    Ok(())
}
