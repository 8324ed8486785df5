use crate::config::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::domain::model::Credentials;
use crate::utils::error::{GpaError, Result};
use crate::utils::validation::validate_non_empty_string;
use clap::Parser;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Parser)]
#[command(name = "fcai-gpa")]
#[command(about = "Fetch your FCAI courses and calculate your GPA according to the bylaw")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Student ID used to log in (prompted for when omitted)
    #[arg(long, env = "FCAI_STUDENT_ID")]
    pub student_id: Option<String>,

    /// Portal password (prompted for when omitted)
    #[arg(long, env = "FCAI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override the portal API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the directory the courses file is written to
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override the bylaw file location
    #[arg(long)]
    pub bylaw: Option<String>,

    /// Create a default bylaw file if none exists
    #[arg(long)]
    pub init_bylaw: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 命令列參數覆蓋 TOML 設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if let Some(bylaw) = &self.bylaw {
            config.bylaw.path = bylaw.clone();
        }
        if self.init_bylaw {
            config.bylaw.create_default = true;
        }
    }

    /// Uses the flags/environment when set and asks on the terminal otherwise.
    pub fn resolve_credentials<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credentials> {
        let username = match &self.student_id {
            Some(id) => id.clone(),
            None => prompt(input, output, "Enter your student ID: ")?,
        };
        validate_non_empty_string("student_id", &username).map_err(|_| {
            GpaError::MissingConfigError {
                field: "student_id".to_string(),
            }
        })?;

        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt(input, output, "Enter your password: ")?,
        };
        if password.is_empty() {
            return Err(GpaError::MissingConfigError {
                field: "password".to_string(),
            });
        }

        Ok(Credentials::new(username.trim(), password))
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<String> {
    output.write_all(message.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
