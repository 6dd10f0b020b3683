use std::future::Future;
use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::command::Mode;
use crate::poll::{self, PollConfig};
use crate::target::{bind_for, Target};

/// Everything one run of the dispatcher needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    pub mode: Option<Mode>,
    pub poll: PollConfig,
}

impl Config {
    pub fn new(target: Target, mode: Option<Mode>) -> Self {
        Self {
            target,
            mode,
            poll: PollConfig::default(),
        }
    }
}

/// Carries out the configured mode against the target.
///
/// Reboot commands are sent once and not answered. The logger runs until
/// `shutdown` resolves. The socket is dropped before this returns, whichever
/// way it returns.
pub async fn dispatch<W, F>(config: &Config, out: &mut W, shutdown: F) -> Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let Some(mode) = config.mode else {
        writeln!(out, "Pick a mode!")?;
        return Ok(());
    };

    let addr = config.target.resolve().await?;
    let socket = bind_for(addr).await?;

    match mode {
        Mode::Reboot | Mode::Bootloader => {
            let command = mode.command();
            socket
                .send_to(&[command.byte()], addr)
                .await
                .with_context(|| format!("failed to send {command} to {addr}"))?;
            info!("sent {command} to {addr}");
            if mode == Mode::Reboot {
                writeln!(out, "Sending rebooten request!")?;
            } else {
                writeln!(out, "Sending rebooten-to-bootloader request!")?;
            }
        }
        Mode::Logger => {
            writeln!(out, "Continual log pull:")?;
            out.flush()?;
            let stats = poll::run(&socket, addr, &config.poll, out, shutdown).await?;
            writeln!(out, "\nExiting")?;
            info!("log pull from {addr} finished: {stats}");
        }
    }

    Ok(())
}
