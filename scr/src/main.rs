mod args;
mod config;

use std::io::{self, Write};

use clap::Parser;
use crossterm::execute;
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::tty::IsTty;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scr_core::{child_running, Engine, Error, Outcome, ProcessHost, ScriptRequest, Value};

use crate::args::{Args, Command, Format};
use crate::config::Colors;

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(config::log_level(args.verbose).into()))
        .init();

    // While the interpreter runs it shares our terminal and gets the interrupt
    // too; its exit status tells us what happened.
    if let Err(e) = ctrlc::set_handler(|| {
        if !child_running() {
            std::process::exit(config::INTERRUPTED);
        }
    }) {
        tracing::warn!("could not install the ctrl-c handler: {e}");
    }

    match run(args) {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => {
            report(&e);
            let code = match e {
                Error::Interpreter { status, .. } => status.raw_code(),
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

fn run(args: Args) -> scr_core::Result<Option<String>> {
    let mut engine = Engine::new(ProcessHost::new(&args.interpreter));

    let value = match args.command {
        Command::Eval { code, extra } => engine.eval(&code, extra)?,

        Command::Script { script_path, extra } => {
            let request = ScriptRequest {
                extra,
                script_path,
                cwd: std::env::current_dir()?,
            };
            match engine.script(request, io::stdin().lock())? {
                Outcome::Listing(scripts) if scripts.is_empty() => return Ok(None),
                Outcome::Listing(scripts) => return Ok(Some(scripts.join("\n"))),
                Outcome::Returned(value) => value,
            }
        }
    };

    match value {
        None | Some(Value::Null) => Ok(None),

        #[cfg(feature = "serde")]
        Some(value) if args.json => Ok(Some(value.as_json()?)),

        Some(value) => Ok(Some(match args.format {
            Format::VarExport => value.var_export(),
            Format::String => value.to_plain(),
        })),
    }
}

fn report(e: &Error) {
    let mut stderr = io::stderr();
    if stderr.is_tty() {
        let _ = execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print("scr:"),
            ResetColor,
            Print(format!(" {e}\n"))
        );
    } else {
        let _ = writeln!(stderr, "scr: {e}");
    }
}
