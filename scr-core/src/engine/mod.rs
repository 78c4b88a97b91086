pub mod args;
pub mod exec;
pub mod host;
pub mod resolve;
pub mod shebang;
pub mod value;


use std::io::Read;
use std::path::PathBuf;

use self::args::Arguments;
use self::exec::{execute, Program};
use self::host::Host;
use self::resolve::{resolve, Resolution};
use self::value::Value;
use crate::path::Catalog;
use crate::Result;

pub const SCRIPT_COMMAND: &str = "script";
pub const EVAL_COMMAND: &str = "eval";

/// Launcher arguments that precede the script's own: the command name and
/// the script path.
const SCRIPT_SHIFT: usize = 2;

/// File conventions the engine looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    /// Extension of script files, without the dot.
    pub suffix: String,
    /// Name that must appear on a `#!` line for the file to be self-aware.
    pub interpreter: String,
    /// Line separating a self-aware script's header from its body.
    pub code_start: String,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            suffix: "php".to_string(),
            interpreter: "scr".to_string(),
            code_start: "<?php".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptRequest {
    /// Script name followed by the arguments meant for it.
    pub extra: Vec<String>,
    /// Additional directories, separated by the platform path separator.
    pub script_path: String,
    pub cwd: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Listing(Vec<String>),
    Returned(Option<Value>),
}

pub struct Engine<H> {
    host: H,
    rules: Rules,
    args: Arguments,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H) -> Self {
        Self::with_rules(host, Rules::default())
    }

    pub fn with_rules(host: H, rules: Rules) -> Self {
        Self {
            host,
            rules,
            args: Arguments::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Arguments of the last invocation, as the executed code saw them.
    pub fn arguments(&self) -> &Arguments {
        &self.args
    }

    /// Evaluate inline code. Nothing is shifted: the code sees every argument,
    /// and whatever it returns is handed back as is.
    pub fn eval(&mut self, code: &str, extra: Vec<String>) -> Result<Option<Value>> {
        self.args = Arguments::new(argv(EVAL_COMMAND, code, extra));
        let program = Program::Inline(format!("{code};").into_bytes());
        execute(&mut self.host, program, &self.args)
    }

    /// List, or find and run, a script.
    pub fn script(&mut self, request: ScriptRequest, mut stdin: impl Read) -> Result<Outcome> {
        let ScriptRequest {
            mut extra,
            script_path,
            cwd,
        } = request;

        let name = if extra.is_empty() {
            String::new()
        } else {
            extra.remove(0)
        };

        let catalog = Catalog::build(&script_path, &cwd);
        tracing::debug!("Searching for scripts in {catalog}");

        let path = match resolve(&name, &catalog, &self.rules.suffix)? {
            Resolution::List => {
                let scripts = catalog
                    .scripts(&self.rules.suffix)
                    .map(|p| p.display().to_string())
                    .collect();
                return Ok(Outcome::Listing(scripts));
            }

            Resolution::Stdin => {
                let mut code = Vec::new();
                stdin.read_to_end(&mut code)?;

                self.args = Arguments::new(argv(SCRIPT_COMMAND, &name, extra));
                let value = execute(&mut self.host, Program::Inline(code), &self.args)?;
                return Ok(Outcome::Returned(value));
            }

            Resolution::Script(path) => path,
        };

        tracing::info!("running {}", path.display());

        self.args = Arguments::new(argv(SCRIPT_COMMAND, &name, extra));
        self.args.set_skip(SCRIPT_SHIFT);

        let program = match shebang::sniff(&path, &self.rules)? {
            Some(header) => Program::Sniffed(header),
            None => Program::Include(path),
        };

        let value = execute(&mut self.host, program, &self.args)?;
        Ok(Outcome::Returned(value))
    }
}

fn argv(command: &str, target: &str, extra: Vec<String>) -> Vec<String> {
    let mut argv = Vec::with_capacity(extra.len() + 2);
    argv.push(command.to_string());
    argv.push(target.to_string());
    argv.extend(extra);
    argv
}
