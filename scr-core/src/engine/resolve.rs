use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::path::Catalog;
use crate::{Error, Result};

/// Identifier that makes the engine read the program from standard input.
pub const STDIN_SENTINEL: &str = "-";

/// Tracks every location tried for a name until one matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCandidate {
    pub requested: String,
    pub attempted: Vec<PathBuf>,
}

impl ScriptCandidate {
    fn new(requested: &str) -> Self {
        Self {
            requested: requested.to_string(),
            attempted: Vec::new(),
        }
    }

    fn not_found(self) -> Error {
        Error::NotFound {
            name: self.requested,
            attempted: self.attempted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    List,
    Stdin,
    Script(PathBuf),
}

/// One way of turning a location-relative candidate into a path to check.
pub struct Variant {
    pub name: &'static str,
    pub apply: fn(&Path, &str) -> PathBuf,
}

/// Checked in order inside every location; the first existing path wins.
pub const VARIANTS: &[Variant] = &[
    Variant {
        name: "suffixed",
        apply: with_suffix,
    },
    Variant {
        name: "bare",
        apply: bare,
    },
];

fn with_suffix(candidate: &Path, suffix: &str) -> PathBuf {
    let mut path = candidate.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

fn bare(candidate: &Path, _: &str) -> PathBuf {
    candidate.to_path_buf()
}

pub fn resolve(name: &str, catalog: &Catalog, suffix: &str) -> Result<Resolution> {
    if name.is_empty() {
        return Ok(Resolution::List);
    }

    if name == STDIN_SENTINEL {
        return Ok(Resolution::Stdin);
    }

    let direct = catalog.cwd().join(name);
    if direct.exists() {
        tracing::debug!("'{name}' is a direct path");
        return Ok(Resolution::Script(direct));
    }

    let mut candidate = ScriptCandidate::new(name);
    for location in catalog.locations() {
        let base = in_location(&location.path, name);

        let found = VARIANTS.iter().find_map(|variant| {
            let path = (variant.apply)(&base, suffix);
            tracing::debug!("trying {} ({})", path.display(), variant.name);
            path.exists().then_some(path)
        });

        match found {
            Some(path) => return Ok(Resolution::Script(path)),
            None => candidate.attempted.push(base),
        }
    }

    Err(candidate.not_found())
}

/// `location/name`, even when `name` is absolute.
fn in_location(location: &Path, name: &str) -> PathBuf {
    let mut path = OsString::from(location.as_os_str());
    path.push("/");
    path.push(name);
    PathBuf::from(path)
}
