use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Entries skipped at every depth when listing scripts.
const IGNORED: [&str; 3] = [".", "..", "CVS"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLocation {
    pub path: PathBuf,
    pub is_cwd: bool,
    pub recurse: bool,
}

impl SearchLocation {
    fn cwd(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            is_cwd: true,
            recurse: false,
        }
    }

    fn extra(path: PathBuf) -> Self {
        let recurse = !is_fs_root(&path);
        Self {
            path,
            is_cwd: false,
            recurse,
        }
    }
}

/// Ordered set of directories searched during one invocation. The current
/// directory always comes first.
#[derive(Debug, Clone)]
pub struct Catalog {
    locations: Vec<SearchLocation>,
}

impl Catalog {
    pub fn build(extra_paths: &str, cwd: &Path) -> Self {
        let mut locations = vec![SearchLocation::cwd(cwd)];
        locations.extend(
            env::split_paths(extra_paths)
                .filter(|p| !p.as_os_str().is_empty())
                .map(SearchLocation::extra),
        );
        Self { locations }
    }

    pub fn locations(&self) -> &[SearchLocation] {
        &self.locations
    }

    pub fn cwd(&self) -> &Path {
        &self.locations[0].path
    }

    /// Lazily walk every location for files ending in `.<suffix>`.
    ///
    /// Each call starts a fresh walk, so the result only depends on the
    /// catalog and the state of the filesystem.
    pub fn scripts(&self, suffix: &str) -> Scripts {
        Scripts {
            locations: self.locations.clone().into_iter(),
            extension: format!(".{suffix}"),
            frames: Vec::new(),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths = self
            .locations
            .iter()
            .map(|l| l.path.display().to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", paths.join(","))
    }
}

struct Entry {
    path: PathBuf,
    is_dir: bool,
}

struct Frame {
    entries: std::vec::IntoIter<Entry>,
    recurse: bool,
}

pub struct Scripts {
    locations: std::vec::IntoIter<SearchLocation>,
    extension: String,
    frames: Vec<Frame>,
}

impl Scripts {
    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&self.extension))
            .unwrap_or(false)
    }
}

impl Iterator for Scripts {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                let location = self.locations.next()?;
                tracing::trace!("scanning {}", location.path.display());
                self.frames.push(Frame {
                    entries: read_sorted(&location.path).into_iter(),
                    recurse: location.recurse,
                });
                continue;
            };

            let recurse = frame.recurse;
            let Some(entry) = frame.entries.next() else {
                self.frames.pop();
                continue;
            };

            if recurse && entry.is_dir {
                self.frames.push(Frame {
                    entries: read_sorted(&entry.path).into_iter(),
                    recurse,
                });
            } else if self.matches(&entry.path) {
                return Some(entry.path);
            }
        }
    }
}

/// Directory entries sorted by name, minus the ignored ones. Unreadable
/// directories are treated as empty. Symlinks are never reported as
/// directories, so a link cycle cannot be walked.
fn read_sorted(dir: &Path) -> Vec<Entry> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut entries = entries
        .filter_map(|e| e.ok())
        .filter(|e| !IGNORED.iter().any(|i| e.file_name().as_os_str() == *i))
        .map(|e| Entry {
            is_dir: e.file_type().map(|t| t.is_dir()).unwrap_or(false),
            path: e.path(),
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    entries
}

pub fn is_fs_root(path: &Path) -> bool {
    path.has_root() && path.parent().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn build_puts_cwd_first() {
        let catalog = Catalog::build("/opt/scripts:/srv/more", Path::new("/work"));
        let paths = catalog
            .locations()
            .iter()
            .map(|l| l.path.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                PathBuf::from("/work"),
                PathBuf::from("/opt/scripts"),
                PathBuf::from("/srv/more")
            ],
            paths
        );
        assert!(catalog.locations()[0].is_cwd);
        assert!(!catalog.locations()[1].is_cwd);
    }

    #[test]
    fn empty_path_list_has_only_cwd() {
        let catalog = Catalog::build("", Path::new("/work"));
        assert_eq!(1, catalog.locations().len());

        let catalog = Catalog::build("::", Path::new("/work"));
        assert_eq!(1, catalog.locations().len());
    }

    #[test]
    fn recursion_flags() {
        let catalog = Catalog::build("/:/opt/scripts", Path::new("/work"));
        let flags = catalog
            .locations()
            .iter()
            .map(|l| l.recurse)
            .collect::<Vec<_>>();
        assert_eq!(vec![false, false, true], flags);
    }

    #[test]
    fn display_joins_with_commas() {
        let catalog = Catalog::build("/a:/b", Path::new("/work"));
        assert_eq!("/work,/a,/b", catalog.to_string());
    }

    #[test]
    fn lists_scripts_in_catalog_order() {
        let cwd = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();

        touch(&cwd.path().join("b.php"));
        touch(&cwd.path().join("a.php"));
        touch(&cwd.path().join("notes.txt"));
        touch(&cwd.path().join("nested").join("deep.php"));
        touch(&extra.path().join("a.php"));
        touch(&extra.path().join("sub").join("c.php"));

        let paths = extra.path().display().to_string();
        let catalog = Catalog::build(&paths, cwd.path());
        let listed = catalog.scripts("php").collect::<Vec<_>>();

        assert_eq!(
            vec![
                cwd.path().join("a.php"),
                cwd.path().join("b.php"),
                extra.path().join("a.php"),
                extra.path().join("sub").join("c.php"),
            ],
            listed
        );
    }

    #[test]
    fn listing_skips_cvs_at_every_depth() {
        let cwd = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();

        touch(&extra.path().join("CVS").join("hidden.php"));
        touch(&extra.path().join("sub").join("CVS").join("hidden.php"));
        touch(&extra.path().join("sub").join("shown.php"));

        let paths = extra.path().display().to_string();
        let catalog = Catalog::build(&paths, cwd.path());
        let listed = catalog.scripts("php").collect::<Vec<_>>();

        assert_eq!(vec![extra.path().join("sub").join("shown.php")], listed);
    }

    #[test]
    fn listing_is_restartable() {
        let cwd = tempfile::tempdir().unwrap();
        touch(&cwd.path().join("one.php"));

        let catalog = Catalog::build("", cwd.path());
        let first = catalog.scripts("php").collect::<Vec<_>>();
        let second = catalog.scripts("php").collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(1, first.len());
    }

    #[test]
    fn missing_directories_list_nothing() {
        let catalog = Catalog::build("/does/not/exist", Path::new("/nor/does/this"));
        assert_eq!(0, catalog.scripts("php").count());
    }

    #[test]
    fn script_named_directories() {
        let cwd = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();

        fs::create_dir(cwd.path().join("tools.php")).unwrap();
        touch(&extra.path().join("lib.php").join("inner.php"));

        let paths = extra.path().display().to_string();
        let catalog = Catalog::build(&paths, cwd.path());
        let listed = catalog.scripts("php").collect::<Vec<_>>();

        assert_eq!(
            vec![
                cwd.path().join("tools.php"),
                extra.path().join("lib.php").join("inner.php"),
            ],
            listed
        );
    }

    #[test]
    fn symlink_cycles_are_not_followed() {
        let cwd = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();

        touch(&extra.path().join("sub").join("real.php"));
        std::os::unix::fs::symlink(extra.path(), extra.path().join("sub").join("loop")).unwrap();

        let paths = extra.path().display().to_string();
        let catalog = Catalog::build(&paths, cwd.path());
        let listed = catalog.scripts("php").collect::<Vec<_>>();

        assert_eq!(vec![extra.path().join("sub").join("real.php")], listed);
    }
}
