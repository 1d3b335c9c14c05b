//! 游戏设置
//!
//! JSON 格式，读取失败时回退到默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use protocol::{Difficulty, Player, ROUND_DURATION_SECS, TICK_INTERVAL, WARNING_THRESHOLD_SECS};
use serde::{Deserialize, Serialize};
use tictactoe_ai::AiConfig;

use crate::clock::ClockConfig;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// 用于 EnvFilter 的级别名
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 游戏设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 默认 AI 难度
    pub difficulty: Difficulty,
    /// AI 执哪一方；None 为双人对战
    pub ai_player: Option<Player>,
    /// 每局时长（秒）
    pub round_duration_secs: u32,
    /// 警告阈值（秒）
    pub warning_threshold_secs: u32,
    /// 是否加入 AI 思考延迟
    pub ai_think_delay: bool,
    /// 日志级别
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            ai_player: Some(Player::B),
            round_duration_secs: ROUND_DURATION_SECS,
            warning_threshold_secs: WARNING_THRESHOLD_SECS,
            ai_think_delay: true,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("tictactoe-timed");
            path.push("settings.json");
            path
        })
    }

    /// 从默认位置加载，任何失败都回退到默认设置
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("无法获取配置目录，使用默认设置");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("设置文件不存在，使用默认设置");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!("已加载设置: {:?}", path);
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}，使用默认设置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取设置文件: {:?}", path))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("设置文件格式无效: {:?}", path))?;
        settings.validated()
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self).context("序列化设置失败")?;
        std::fs::write(path, content).with_context(|| format!("写入设置文件失败: {:?}", path))?;
        tracing::info!("设置已保存: {:?}", path);
        Ok(())
    }

    fn validated(self) -> Result<Self> {
        if self.round_duration_secs == 0 {
            anyhow::bail!("每局时长必须大于 0");
        }
        if self.warning_threshold_secs >= self.round_duration_secs {
            anyhow::bail!(
                "警告阈值 {} 秒必须小于每局时长 {} 秒",
                self.warning_threshold_secs,
                self.round_duration_secs
            );
        }
        Ok(self)
    }

    /// 计时器参数
    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            duration_secs: self.round_duration_secs,
            warning_secs: self.warning_threshold_secs,
            tick: TICK_INTERVAL,
        }
    }

    /// 指定难度的 AI 参数
    pub fn ai_config(&self, difficulty: Difficulty) -> AiConfig {
        if self.ai_think_delay {
            AiConfig::from_difficulty(difficulty)
        } else {
            AiConfig::instant(difficulty)
        }
    }

    /// 每局时长
    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.round_duration_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.round_duration(), protocol::ROUND_DURATION);
        assert_eq!(settings.clock_config(), ClockConfig::default());
        assert_eq!(settings.ai_player, Some(Player::B));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            difficulty: Difficulty::Hard,
            ai_player: None,
            round_duration_secs: 30,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "difficulty": "Easy" }"#).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert_eq!(settings.round_duration_secs, ROUND_DURATION_SECS);
    }

    #[test]
    fn test_invalid_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Settings::load_from(&path).is_err());

        std::fs::write(&path, r#"{ "round_duration_secs": 5, "warning_threshold_secs": 10 }"#).unwrap();
        assert!(Settings::load_from(&path).is_err());

        assert!(Settings::load_from(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_ai_config_respects_delay_flag() {
        let mut settings = Settings::default();
        assert_eq!(settings.ai_config(Difficulty::Easy).think_min_ms, 500);
        settings.ai_think_delay = false;
        assert_eq!(settings.ai_config(Difficulty::Easy), AiConfig::instant(Difficulty::Easy));
    }
}
