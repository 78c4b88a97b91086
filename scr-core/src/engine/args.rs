/// Arguments of one invocation, together with how many leading entries
/// belong to the launcher rather than the script.
///
/// The launcher writes the skip count once, right before a resolved script
/// runs. Everything that reads arguments on behalf of the script goes through
/// [`Arguments::visible`] or [`Arguments::shift`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    argv: Vec<String>,
    skip: usize,
    cursor: usize,
}

impl Arguments {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            skip: 0,
            cursor: 0,
        }
    }

    /// Every argument, including the launcher's own.
    pub fn all(&self) -> &[String] {
        &self.argv
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn set_skip(&mut self, skip: usize) {
        self.skip = skip;
        self.cursor = 0;
    }

    /// The arguments meant for the script.
    pub fn visible(&self) -> &[String] {
        self.argv.get(self.skip..).unwrap_or_default()
    }

    /// Take the next visible argument.
    pub fn shift(&mut self) -> Option<&str> {
        let arg = self.argv.get(self.skip + self.cursor)?;
        self.cursor += 1;
        Some(arg.as_str())
    }

    pub fn reset(&mut self) {
        self.skip = 0;
        self.cursor = 0;
    }
}
