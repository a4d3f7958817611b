use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// 기본 설정 파일 경로.
pub const CONFIG_PATH: &str = "config.toml";

/// 입력 폼을 처음 채울 때 쓰는 값. 사용자가 입력하는 형태 그대로 문자열로 보관한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    /// 압력 [atm]
    pub pressure: String,
    /// 온도 [°C]
    pub temperature: String,
    /// 가스 식별자 → 조성 [%]
    pub percentages: BTreeMap<String, String>,
}

impl Default for FormDefaults {
    fn default() -> Self {
        let percentages = [("O2", "21.0"), ("N2", "79.0"), ("He", "0.0"), ("CO2", "0.0")]
            .into_iter()
            .map(|(gas, pct)| (gas.to_string(), pct.to_string()))
            .collect();
        Self {
            pressure: "1.0".to_string(),
            temperature: "25.0".to_string(),
            percentages,
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드. "auto" 면 시스템 로케일을 따른다.
    pub language: String,
    pub defaults: FormDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            defaults: FormDefaults::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_create(Path::new(CONFIG_PATH))
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본 설정을 저장하고 반환한다.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        info!(path = %path.display(), "created default config");
        Ok(cfg)
    }
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 config.toml에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(CONFIG_PATH))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        save_config(self, path)
    }
}
