//! Command-line configuration.
//!
//! Arguments are parsed by hand: the surface is one subcommand, one
//! positional argument and a few flags.

/// What the binary was asked to do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// Print usage.
    #[default]
    Help,
    /// Compile and report diagnostics only.
    Check,
    /// Compile and run every entry point.
    Run,
    /// Compile and print the generated IR.
    Emit,
    /// Print the documentation for an error code.
    Explain,
}

impl Command {
    fn from_name(name: &str) -> Option<Command> {
        match name {
            "check" => Some(Command::Check),
            "run" | "test" => Some(Command::Run),
            "emit" => Some(Command::Emit),
            "explain" => Some(Command::Explain),
            "help" | "--help" | "-h" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    /// Input path, or the error code for `explain`.
    pub input: Option<String>,
    /// Only run entries whose description contains this text.
    pub filter: Option<String>,
    pub verbose: bool,
    /// Render log spans as a tree.
    pub trace_tree: bool,
}

impl Config {
    /// Parse `args`, excluding the program name.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Config, String> {
        let mut args = args.iter().map(AsRef::as_ref);
        let mut config = Config::default();
        let Some(name) = args.next() else {
            return Ok(config);
        };
        config.command = Command::from_name(name).ok_or_else(|| format!("unknown command `{name}`"))?;

        for arg in args {
            if let Some(filter) = arg.strip_prefix("--filter=") {
                config.filter = Some(filter.to_owned());
            } else if arg == "-v" || arg == "--verbose" {
                config.verbose = true;
            } else if arg == "--trace-tree" {
                config.trace_tree = true;
            } else if arg.starts_with('-') {
                return Err(format!("unknown option `{arg}`"));
            } else if config.input.is_none() {
                config.input = Some(arg.to_owned());
            } else {
                return Err(format!("unexpected argument `{arg}`"));
            }
        }

        if config.command != Command::Help && config.input.is_none() {
            let what = if config.command == Command::Explain {
                "error code"
            } else {
                "file path"
            };
            return Err(format!("missing {what}"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
