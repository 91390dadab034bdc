use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub generation: Generation,
    pub requests: Requests,
    pub parsing: Parsing,
    pub evidence: Evidence,
    pub export: Export,
    pub defaults: Defaults,
    pub fallbacks: Fallbacks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub api_base: String,
    pub model: String,
}

/// How many comments to ask for on top of the real need, since the service
/// rarely writes exactly the requested count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requests {
    pub inflation: f64,
    pub buffer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parsing {
    pub min_comment_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub excerpt_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub sheet_name: String,
    pub file_prefix: String,
    pub comment_column_width: f64,
    pub sample_size: usize,
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    pub subject: String,
    pub lesson: String,
    pub comment_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fallbacks {
    pub pool_filler: String,
    pub assignment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: Generation {
                api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.5-flash-lite-preview-09-2025".to_string(),
            },
            requests: Requests {
                inflation: 0.10,
                buffer: 2,
            },
            parsing: Parsing {
                min_comment_chars: 16,
            },
            evidence: Evidence {
                excerpt_chars: 2000,
            },
            export: Export {
                sheet_name: "Sheet1".to_string(),
                file_prefix: "NhanXet_NoDuplicate".to_string(),
                comment_column_width: 60.0,
                sample_size: 5,
                preview_rows: 3,
            },
            defaults: Defaults {
                subject: "Tin học".to_string(),
                lesson: "Chủ đề E".to_string(),
                comment_column: "Nhận xét GV".to_string(),
            },
            fallbacks: Fallbacks {
                pool_filler: "Hoàn thành nhiệm vụ học tập.".to_string(),
                assignment: "Đã hoàn thành bài học.".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let default_path = Path::new("settings.default.ron");
        let override_path = Path::new("settings.ron");

        let mut settings = if default_path.exists() {
            read_ron(default_path).unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Some(overrides) = read_ron(override_path) {
                settings = overrides;
            }
        }

        settings
    }
}

fn read_ron(path: &Path) -> Option<Settings> {
    let content = fs::read_to_string(path).ok()?;
    match ron::from_str::<Settings>(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_ron() {
        let defaults = Settings::default();
        let text = ron::ser::to_string_pretty(&defaults, Default::default()).unwrap();
        let parsed: Settings = ron::from_str(&text).unwrap();
        assert_eq!(parsed.parsing.min_comment_chars, 16);
        assert_eq!(parsed.defaults.comment_column, "Nhận xét GV");
        assert_eq!(parsed.requests.buffer, 2);
    }

    #[test]
    fn test_invalid_ron_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(&path, "(generation: oops").unwrap();
        assert!(read_ron(&path).is_none());
    }
}
