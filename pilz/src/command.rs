use std::fmt;

/// Single-byte commands understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the buffered log contents.
    Log,
    /// Reboot into the UF2 bootloader.
    Bootloader,
    /// Plain application reboot.
    Reboot,
}

impl Command {
    pub const fn byte(self) -> u8 {
        match self {
            Command::Log => b'x',
            Command::Bootloader => b'r',
            Command::Reboot => b'n',
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Command> {
        match byte {
            b'x' => Some(Command::Log),
            b'r' => Some(Command::Bootloader),
            b'n' => Some(Command::Reboot),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Log => "log",
            Command::Bootloader => "bootloader",
            Command::Reboot => "reboot",
        };
        write!(f, "{name} ('{}')", self.byte() as char)
    }
}

/// What a single run of the dispatcher does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reboot,
    Bootloader,
    Logger,
}

impl Mode {
    /// Picks the mode from the CLI flags. The first set flag wins, in the
    /// order reboot, bootloader, logger.
    pub fn from_flags(rebooten: bool, bootloader: bool, logger: bool) -> Option<Mode> {
        if rebooten {
            Some(Mode::Reboot)
        } else if bootloader {
            Some(Mode::Bootloader)
        } else if logger {
            Some(Mode::Logger)
        } else {
            None
        }
    }

    pub const fn command(self) -> Command {
        match self {
            Mode::Reboot => Command::Reboot,
            Mode::Bootloader => Command::Bootloader,
            Mode::Logger => Command::Log,
        }
    }
}
