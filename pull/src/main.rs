use anyhow::Result;
use clap::Parser;
use log::error;
use pilz::{dispatch, Config, Mode, Target, DEVICE_PORT};

/// Send commands to the pilsner controller or pull its log.
#[derive(Parser, Debug)]
struct Args {
    /// Controller IP address or hostname
    #[arg(long)]
    host: String,
    #[arg(long, default_value_t = DEVICE_PORT)]
    port: u16,
    /// Pull the log continuously until ctrl-c
    #[arg(long)]
    logger: bool,
    /// Reboot the application now
    #[arg(long)]
    rebooten: bool,
    /// Reboot into the bootloader
    #[arg(long)]
    bootloader: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config::new(
            Target::new(&self.host).with_port(self.port),
            Mode::from_flags(self.rebooten, self.bootloader, self.logger),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Args::parse().config();
    let mut stdout = std::io::stdout().lock();

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("unable to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    dispatch(&config, &mut stdout, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn host_is_required() {
        let err = Args::try_parse_from(["pull", "--logger"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn reboot_wins_over_other_flags() {
        let args =
            Args::try_parse_from(["pull", "--host", "10.0.0.7", "--logger", "--rebooten"]).unwrap();
        let config = args.config();
        assert_eq!(config.mode, Some(Mode::Reboot));
        assert_eq!(config.target, Target::new("10.0.0.7"));
    }

    #[test]
    fn no_flags_means_no_mode() {
        let args = Args::try_parse_from(["pull", "--host", "pilz.local"]).unwrap();
        assert_eq!(args.config().mode, None);
    }

    #[test]
    fn port_override() {
        let args =
            Args::try_parse_from(["pull", "--host", "10.0.0.7", "--port", "4321", "--bootloader"])
                .unwrap();
        let config = args.config();
        assert_eq!(config.target.port, 4321);
        assert_eq!(config.mode, Some(Mode::Bootloader));
    }
}
