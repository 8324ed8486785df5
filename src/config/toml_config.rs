use crate::config::bylaw::DEFAULT_BYLAW_FILE;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{GpaError, Result};
use crate::utils::validation::{
    validate_allowed_values, validate_path, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://193.227.14.58/api";
pub const DEFAULT_CONFIG_FILE: &str = "fcai-gpa.toml";
pub const SUPPORTED_FORMATS: [&str; 2] = ["json", "csv"];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub bylaw: BylawConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub page_size: usize,
    pub include_withdrawn: bool,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            page_size: 150,
            include_withdrawn: true,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub courses_file: String,
    pub formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            courses_file: "fcai_courses.json".to_string(),
            formats: vec!["json".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BylawConfig {
    pub path: String,
    pub create_default: bool,
}

impl Default for BylawConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_BYLAW_FILE.to_string(),
            create_default: false,
        }
    }
}

impl SourceConfig {
    /// 設定檔中的標頭優先，其餘補上瀏覽器預設值
    pub fn resolved_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::from([
            ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
            (
                "Accept".to_string(),
                "application/json, text/plain, */*".to_string(),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]);

        if let Ok(url) = url::Url::parse(&self.base_url) {
            let origin = url.origin().ascii_serialization();
            headers.insert("Referer".to_string(), format!("{}/", origin));
            headers.insert("Origin".to_string(), origin);
        }

        if let Some(custom) = &self.headers {
            for (key, value) in custom {
                headers.insert(key.clone(), value.clone());
            }
        }

        headers
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GpaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            tracing::info!("📁 Loading configuration from: {}", path.as_ref().display());
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No configuration file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GpaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FCAI_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| GpaError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("source.base_url", &self.source.base_url)?;
        validate_positive_number("source.page_size", self.source.page_size, 1)?;
        validate_positive_number(
            "source.timeout_seconds",
            self.source.timeout_seconds as usize,
            1,
        )?;
        validate_path("output.path", &self.output.path)?;
        validate_path("output.courses_file", &self.output.courses_file)?;
        validate_allowed_values("output.formats", &self.output.formats, &SUPPORTED_FORMATS)?;
        validate_path("bylaw.path", &self.bylaw.path)?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn courses_file(&self) -> &str {
        &self.output.courses_file
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
