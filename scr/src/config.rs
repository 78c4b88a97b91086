use crossterm::style::Color;
use tracing::Level;

pub const DEFAULT_INTERPRETER: &str = "php";

/// Exit code after an interrupt that arrives while no interpreter is running.
pub const INTERRUPTED: i32 = 130;

pub struct Colors;

impl Colors {
    pub const ERROR: Color = Color::Red;
}

/// Log level for the number of `-v` flags given.
pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
