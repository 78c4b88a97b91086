use std::fmt;
use std::fs;
use std::io::Write;
use std::os::unix::prelude::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::Signal;

use super::args::Arguments;
use super::value::Value;
use crate::{Error, Result};

/// The capability that actually runs code. The engine decides what bytes are
/// evaluated and when; the host decides how.
pub trait Host {
    /// Evaluate `code` as a program body and return its value.
    fn eval(&mut self, code: &[u8], args: &Arguments) -> Result<Value>;

    /// Run a whole file. Hosts that understand files natively should
    /// override this.
    fn include(&mut self, path: &Path, args: &Arguments) -> Result<Value> {
        let code = fs::read(path)?;
        self.eval(&code, args)
    }
}

/// Environment variable naming the file the interpreter runs.
pub const PROGRAM_VAR: &str = "SCR_PROGRAM";
/// Environment variable naming the file the interpreter writes its result to.
pub const RESULT_VAR: &str = "SCR_RESULT";

const EVAL_DRIVER: &str = "\
$__scr = eval(file_get_contents(getenv('SCR_PROGRAM')));
file_put_contents(getenv('SCR_RESULT'), json_encode($__scr, JSON_PARTIAL_OUTPUT_ON_ERROR | JSON_PRESERVE_ZERO_FRACTION));
";

const INCLUDE_DRIVER: &str = "\
$argv[0] = getenv('SCR_PROGRAM');
$__scr = include getenv('SCR_PROGRAM');
file_put_contents(getenv('SCR_RESULT'), json_encode($__scr, JSON_PARTIAL_OUTPUT_ON_ERROR | JSON_PRESERVE_ZERO_FRACTION));
";

static CHILD_RUNNING: AtomicBool = AtomicBool::new(false);

/// Whether a [`ProcessHost`] is waiting on its interpreter right now.
pub fn child_running() -> bool {
    CHILD_RUNNING.load(Ordering::SeqCst)
}

/// Runs code through an external PHP command line interpreter.
///
/// The interpreter is started as `<program> -r <driver> -- <args>`, with only
/// the arguments visible to the script. The driver runs the file named by
/// `SCR_PROGRAM` (evaluated for inline code, included for script files) and
/// writes the JSON encoding of its return value to the file named by
/// `SCR_RESULT`. The child inherits stdio. No result written means
/// [`Value::Null`].
#[derive(Debug, Clone)]
pub struct ProcessHost {
    program: PathBuf,
}

impl ProcessHost {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, driver: &str, target: &Path, args: &Arguments) -> Result<Value> {
        let program = self.program.display().to_string();
        let result = tempfile::NamedTempFile::new()?;

        let mut command = process::Command::new(&self.program);
        command
            .arg("-r")
            .arg(driver)
            .arg("--")
            .args(args.visible())
            .env(PROGRAM_VAR, target)
            .env(RESULT_VAR, result.path());
        tracing::debug!("running {} on {}", program, target.display());

        CHILD_RUNNING.store(true, Ordering::SeqCst);
        let status = command.status();
        CHILD_RUNNING.store(false, Ordering::SeqCst);

        let status = status.map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;

        match ExitStatus::from(status) {
            ExitStatus::Code(0) => read_result(result.path()),
            status => Err(Error::Interpreter { program, status }),
        }
    }
}

impl Default for ProcessHost {
    fn default() -> Self {
        Self::new("php")
    }
}

impl Host for ProcessHost {
    fn eval(&mut self, code: &[u8], args: &Arguments) -> Result<Value> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(code)?;
        file.flush()?;
        self.run(EVAL_DRIVER, file.path(), args)
    }

    fn include(&mut self, path: &Path, args: &Arguments) -> Result<Value> {
        self.run(INCLUDE_DRIVER, path, args)
    }
}

fn read_result(path: &Path) -> Result<Value> {
    let bytes = fs::read(path)?;
    if bytes.trim_ascii().is_empty() {
        return Ok(Value::Null);
    }
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;
    Ok(Value::from(json))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Code(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn raw_code(&self) -> i32 {
        match self {
            Self::Code(code) => *code,
            Self::Signal(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(c) => write!(f, "status {c}"),
            Self::Signal(s) => match Signal::try_from(*s) {
                Ok(signal) => write!(f, "signal {}", signal.as_str()),
                Err(_) => write!(f, "signal {s}"),
            },
        }
    }
}

impl From<process::ExitStatus> for ExitStatus {
    fn from(status: process::ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Self::Code(code),
            (None, Some(signal)) => Self::Signal(signal),
            (None, None) => Self::Code(1),
        }
    }
}
