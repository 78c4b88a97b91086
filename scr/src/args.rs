use crate::config;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help("Log more details (repeat for more)")
    )]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = Format::VarExport,
        help("How to print the value returned by the code")
    )]
    pub format: Format,

    #[cfg(feature = "serde")]
    #[arg(long, global = true, help("Print the returned value as JSON"))]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "SCR_INTERPRETER",
        default_value = config::DEFAULT_INTERPRETER,
        help("Interpreter that runs the code")
    )]
    pub interpreter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run a script, or list the available scripts when no name is given
    #[command(visible_aliases = ["scr", "php-script"])]
    Script {
        #[arg(
            long,
            env = "SCR_SCRIPT_PATH",
            default_value = "",
            help("Additional paths to search for scripts, separated by : (; on Windows)")
        )]
        script_path: String,

        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name("script"),
            help("The script to run (`-` reads it from stdin), followed by its arguments")
        )]
        extra: Vec<String>,
    },

    /// Evaluate code given on the command line
    #[command(visible_aliases = ["ev", "php-eval"])]
    Eval {
        #[arg(allow_hyphen_values = true, help("The code to evaluate"))]
        code: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    #[value(name = "var_export")]
    VarExport,
    String,
}
