use std::path::PathBuf;

use super::args::Arguments;
use super::host::Host;
use super::shebang::ShebangHeader;
use super::value::Value;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    Inline(Vec<u8>),
    Sniffed(ShebangHeader),
    Include(PathBuf),
}

/// Run `program` through `host`.
///
/// A script file that returns nothing still evaluates to the success marker,
/// so for scripts that value is reported as no value at all. Inline code
/// returns exactly what it evaluated to.
pub fn execute<H: Host>(
    host: &mut H,
    program: Program,
    args: &Arguments,
) -> Result<Option<Value>> {
    let (value, from_script) = match program {
        Program::Inline(code) => (host.eval(&code, args)?, false),
        Program::Sniffed(header) => (host.eval(&header.program(), args)?, true),
        Program::Include(path) => (host.include(&path, args)?, true),
    };

    if from_script && value.is_success_marker() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}
