use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub messenger: MessengerConfig,
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessengerConfig {
    /// Bot API 基地址，自建网关时覆盖
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// 兑换短码长度
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// 短码冲突时的重试上限
    #[serde(default = "default_code_attempts")]
    pub code_attempts: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            code_attempts: default_code_attempts(),
        }
    }
}

fn default_code_length() -> usize {
    6
}

fn default_code_attempts() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// 单次群发受众上限
    #[serde(default = "default_audience_cap")]
    pub audience_cap: u64,
    /// active 圈选的活跃窗口（天）
    #[serde(default = "default_active_window_days")]
    pub active_window_days: i64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            audience_cap: default_audience_cap(),
            active_window_days: default_active_window_days(),
        }
    }
}

fn default_audience_cap() -> u64 {
    5000
}

fn default_active_window_days() -> i64 {
    7
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    messenger: MessengerConfig::default(),
                    wheel: WheelConfig::default(),
                    broadcast: BroadcastConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("MESSENGER_API_BASE") {
            config.messenger.api_base = v;
        }
        if let Ok(v) = env::var("BROADCAST_AUDIENCE_CAP")
            && let Ok(n) = v.parse()
        {
            config.broadcast.audience_cap = n;
        }
        if let Ok(v) = env::var("BROADCAST_ACTIVE_WINDOW_DAYS")
            && let Ok(n) = v.parse()
        {
            config.broadcast.active_window_days = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/spinpass"
            max_connections = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.messenger.api_base, "https://api.telegram.org");
        assert_eq!(cfg.wheel.code_length, 6);
        assert_eq!(cfg.wheel.code_attempts, 5);
        assert_eq!(cfg.broadcast.audience_cap, 5000);
        assert_eq!(cfg.broadcast.active_window_days, 7);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/spinpass"
            max_connections = 5

            [broadcast]
            audience_cap = 100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.broadcast.audience_cap, 100);
        assert_eq!(cfg.broadcast.active_window_days, 7);
    }
}
