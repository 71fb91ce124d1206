use console::{Style, Term};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// How results are written: prose on a terminal, one JSON document, or
/// tab-separated lines for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    fn from_flag(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Where `laborm` writes. Results go to stdout, everything else to stderr.
pub struct OutputContext {
    pub mode: OutputMode,
    pub verbose: u8,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode: OutputMode::from_flag(&global.format),
            verbose: global.verbose,
            quiet: global.quiet,
            use_color,
        }
    }

    /// A confirmation prompt can only be answered from a terminal.
    pub fn is_interactive(&self) -> bool {
        console::user_attended_stderr()
    }

    fn labelled(&self, label: &str, style: Style, msg: &str) -> String {
        if self.use_color {
            format!("{} {msg}", style.apply_to(label))
        } else {
            format!("{label} {msg}")
        }
    }

    fn chatty(&self) -> bool {
        !self.quiet && self.mode == OutputMode::Human
    }

    pub fn success(&self, msg: &str) {
        if self.chatty() {
            eprintln!("{}", self.labelled("ok", Style::new().green().bold(), msg));
        }
    }

    pub fn status(&self, msg: &str) {
        if self.chatty() {
            eprintln!("{msg}");
        }
    }

    /// Printed only with `-v`.
    pub fn detail(&self, msg: &str) {
        if self.verbose > 0 {
            self.status(msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                eprintln!("{}", self.labelled("warning:", Style::new().yellow().bold(), msg))
            }
            OutputMode::Json => eprintln!("{}", serde_json::json!({ "warning": msg })),
            OutputMode::Plain => eprintln!("warning\t{msg}"),
        }
    }

    /// Schema errors are shown against the schema source in human mode.
    pub fn print_error(&self, err: &CliError) {
        match self.mode {
            OutputMode::Human => {
                for report in err.diagnostics() {
                    eprintln!("{report:?}");
                }
                let line = self.labelled("error:", Style::new().red().bold(), &err.to_string());
                eprintln!("{line}");
            }
            OutputMode::Json => eprintln!("{}", err.to_json()),
            OutputMode::Plain => {
                if let CliError::Syntax { errors, .. } = err {
                    for e in errors {
                        eprintln!("error\t{e}");
                    }
                }
                eprintln!("error\t{err}");
            }
        }
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }
}
