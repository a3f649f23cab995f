use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use builder_codegen::{GenerateOptions, GenerationMode};
use builder_export::remote::{self, ServerCredentials, DEFAULT_KEY};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Compose Builder CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Kotlin package of the generated app
    pub package_name: String,

    /// Name of the screen composable
    pub function_name: String,

    /// Click handler style
    pub mode: GenerationMode,

    /// Directory generated projects are written to
    pub output_dir: PathBuf,

    /// Emit `@Preview` functions
    pub include_preview: bool,

    /// Config key designs are published under
    pub remote_key: String,

    /// Directory backing the local config store
    pub store_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Log format
    pub log_format: LogFormat,

    /// Server credentials, only ever read from the environment
    #[serde(skip)]
    pub credentials: Option<ServerCredentials>,
}

impl Default for Config {
    fn default() -> Self {
        let options = GenerateOptions::default();
        Self {
            package_name: options.package_name,
            function_name: options.function_name,
            mode: options.mode,
            output_dir: PathBuf::from("generated"),
            include_preview: options.include_preview,
            remote_key: DEFAULT_KEY.to_string(),
            store_dir: PathBuf::from(".compose-builder/config"),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            credentials: None,
        }
    }
}

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "compose-builder")]
#[command(version, about = "Generate Jetpack Compose code from Compose Builder designs")]
pub struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, global = true, env = "COMPOSE_BUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kotlin package of the generated app
    #[arg(long, global = true, env = "COMPOSE_BUILDER_PACKAGE")]
    pub package: Option<String>,

    /// Name of the screen composable
    #[arg(long, global = true, env = "COMPOSE_BUILDER_FUNCTION")]
    pub function_name: Option<String>,

    /// Click handler style: static or event-driven
    #[arg(long, global = true, env = "COMPOSE_BUILDER_MODE")]
    pub mode: Option<String>,

    /// Output directory for generated projects
    #[arg(short, long, global = true, env = "COMPOSE_BUILDER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip `@Preview` functions
    #[arg(long, global = true)]
    pub no_preview: bool,

    /// Config key to publish under
    #[arg(long, global = true, env = "COMPOSE_BUILDER_REMOTE_KEY")]
    pub remote_key: Option<String>,

    /// Directory backing the local config store
    #[arg(long, global = true, env = "COMPOSE_BUILDER_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, env = "COMPOSE_BUILDER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, global = true, env = "COMPOSE_BUILDER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate a Compose project from tree JSON
    Generate {
        /// Tree JSON file, or `-` for stdin
        input: PathBuf,

        /// Print the screen source instead of writing the project
        #[arg(long)]
        stdout: bool,
    },

    /// Check that tree JSON imports into a valid tree
    Validate {
        /// Tree JSON file, or `-` for stdin
        input: PathBuf,
    },

    /// Publish tree JSON to the config store
    Publish {
        /// Tree JSON file, or `-` for stdin
        input: PathBuf,
    },

    /// Print the editable properties of a component type
    Schema {
        /// Component type; all palette types when omitted
        component_type: Option<String>,

        /// Check a value against the schema
        #[arg(long, value_name = "NAME=VALUE")]
        check: Vec<String>,
    },
}

impl Config {
    /// Load configuration from defaults, an optional config file, then CLI
    /// args and environment.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(package) = &cli.package {
            config.package_name = package.clone();
        }
        if let Some(function_name) = &cli.function_name {
            config.function_name = function_name.clone();
        }
        if let Some(mode) = &cli.mode {
            config.mode = mode.parse().context("Invalid --mode")?;
        }
        if let Some(output_dir) = &cli.output_dir {
            config.output_dir = output_dir.clone();
        }
        if cli.no_preview {
            config.include_preview = false;
        }
        if let Some(remote_key) = &cli.remote_key {
            config.remote_key = remote_key.clone();
        }
        if let Some(store_dir) = &cli.store_dir {
            config.store_dir = store_dir.clone();
        }
        if let Some(log_level) = &cli.log_level {
            config.log_level = log_level.clone();
        }
        if let Some(log_format) = cli.log_format {
            config.log_format = log_format;
        }

        config.credentials = ServerCredentials::from_env();

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.package_name.trim().is_empty() {
            bail!("package_name must not be empty");
        }
        self.generate_options()
            .validate()
            .context("Invalid generation settings")?;
        remote::validate_key(&self.remote_key).context("Invalid remote_key")?;
        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }
        Ok(())
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            mode: self.mode,
            function_name: self.function_name.clone(),
            package_name: self.package_name.clone(),
            include_preview: self.include_preview,
        }
    }
}
