use anyhow::Result;
use clap::Parser;
use pilz::{probe, Target, DEVICE_PORT, PROBE_TIMEOUT};

/// Send one raw payload to the controller and print what comes back.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    host: String,
    #[arg(long, default_value_t = DEVICE_PORT)]
    port: u16,
    /// Payload sent verbatim as UTF-8
    #[arg(long)]
    stuff: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Args { host, port, stuff } = Args::parse();
    println!("Sending packet to {host}");

    let target = Target::new(host).with_port(port);
    let reply = probe(&target, stuff.as_bytes(), PROBE_TIMEOUT).await?;
    println!("{reply:?}");

    Ok(())
}
