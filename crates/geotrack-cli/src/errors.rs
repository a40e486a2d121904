use console::style;
use std::fmt;
use std::path::Path;

/// Error with context and suggested fixes
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn config_exists(path: &Path) -> CliError {
    CliError::new("Configuration file already exists")
        .with_context(format!("Path: {}", path.display()))
        .with_suggestion("Edit the existing file")
        .with_suggestion("Or overwrite it with defaults: geotrack init --force")
}

pub fn invalid_config(reason: &str, path: &Path) -> CliError {
    CliError::new("Invalid configuration")
        .with_context(format!("Reason: {}\nFile: {}", reason, path.display()))
        .with_suggestion("Check the file for syntax errors and out-of-range values")
        .with_suggestion("Or regenerate it: geotrack init --force")
        .with_help("Run: geotrack config")
}

pub fn store_unavailable(database: &Path, error: &str) -> CliError {
    CliError::new("Cannot open the location database")
        .with_context(format!("Database: {}\n\nError: {}", database.display(), error))
        .with_suggestion("Check that the directory is writable")
        .with_suggestion("Or point at another file: geotrack --database <path> ...")
}

pub fn source_unavailable(error: &str) -> CliError {
    CliError::new("Cannot open the positioning source")
        .with_context(format!("Error: {}", error))
        .with_suggestion("Check the [source] section of the configuration")
        .with_suggestion("Or try the built-in simulator: geotrack run --source simulator")
        .with_help("Run: geotrack run --help")
}

pub fn alert_not_found(id: i64) -> CliError {
    CliError::new(format!("Alert {} not found", id))
        .with_suggestion("List alerts: geotrack alerts")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let message = format!("{:#}", error);

    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("Permission denied") || message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
