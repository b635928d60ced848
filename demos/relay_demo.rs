//! Publish/subscribe round trip through an in-memory caster
//!
//! Run with: cargo run --example relay_demo [CONFIG.toml]
//!
//! Without a config file the caster serves the test mount `TEST00AUS0` with
//! `username`/`password`; otherwise the first configured mount is used.
//!
//! One publisher writes a few fake RTCM frames, pauses for longer than the
//! idle timeout, writes once more and closes. Two subscribers print what they
//! receive until the stream ends.

use std::time::Duration;

use ntrip_rs::{Caster, CasterConfig, SourceService, Subscription};
use tokio::io::AsyncWriteExt;

async fn print_chunks(name: &'static str, mut sub: Subscription) -> usize {
    let mut total = 0;
    while let Some(chunk) = sub.recv().await {
        total += chunk.len();
        println!("[{}] {} bytes: {:02x?}", name, chunk.len(), &chunk[..chunk.len().min(8)]);
    }
    println!("[{}] end of stream ({} bytes total)", name, total);
    total
}

fn print_usage() {
    eprintln!("Usage: relay_demo [CONFIG.toml]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  CONFIG.toml  Caster configuration (default: built-in test mount)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ntrip_rs=debug".parse()?)
                .add_directive("relay_demo=debug".parse()?),
        )
        .init();

    let config = match args.get(1) {
        Some(path) => CasterConfig::from_file(path)?,
        None => CasterConfig::default(),
    };
    let username = config.credentials.username.clone();
    let password = config.credentials.password.clone();
    let idle = config.relay.idle_timeout;
    let mount = config
        .mounts
        .first()
        .map(|m| m.name.clone())
        .unwrap_or_default();
    let mount = mount.as_str();

    let caster = Caster::new(config)?;
    println!("Sourcetable: {}", caster.sourcetable());

    let ctx = caster.context();
    let mut sink = caster.publisher(&ctx, mount, &username, &password)?;

    let first = caster.subscriber(&ctx, mount, &username, &password)?;
    let second = caster.subscriber(&ctx, mount, &username, &password)?;
    let first = tokio::spawn(print_chunks("sub-1", first));
    let second = tokio::spawn(print_chunks("sub-2", second));

    // A second publisher on the same mount is refused
    if let Err(e) = caster.publisher(&ctx, mount, &username, &password) {
        println!("Second publisher rejected: {}", e);
    }

    for (i, len) in [19usize, 64, 300].into_iter().enumerate() {
        let mut frame = vec![0xD3, 0x00, len as u8];
        frame.resize(len, i as u8);
        sink.write_all(&frame).await?;
    }

    println!("Publisher idle for {:?}", idle * 2);
    tokio::time::sleep(idle * 2).await;

    sink.write_all(&[0xD3, 0x00, 0x02, 0xAA, 0xBB]).await?;
    sink.shutdown().await?;

    let (a, b) = (first.await?, second.await?);
    println!("Subscribers received {} and {} bytes", a, b);

    // The mount is free again once the stream has ended
    tokio::time::sleep(Duration::from_millis(10)).await;
    let _sink = caster.publisher(&ctx, mount, &username, &password)?;
    println!("Mount {} re-published", mount);

    caster.shutdown();
    Ok(())
}
