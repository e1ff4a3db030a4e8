//! File configuration adapter: INI, or JSON when the file ends in `.json`.
//!
//! JSON objects at the top level become sections. Top-level scalars land in
//! the `default` section, the same place INI keys before any header go.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use serde_json::Value;
use std::fs;
use std::path::Path;

const DEFAULT_SECTION: &str = "default";

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            let content = fs::read_to_string(path)?;
            return Self::from_json_str(&content).map_err(std::io::Error::other);
        }
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let root: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let Value::Object(entries) = root else {
            return Err("top-level JSON value must be an object".to_string());
        };

        let mut config = Ini::new();
        for (name, value) in entries {
            match value {
                Value::Object(section) => {
                    for (key, value) in section {
                        config.set(&name, &key, json_scalar(value));
                    }
                }
                other => {
                    config.set(DEFAULT_SECTION, &name, json_scalar(other));
                }
            }
        }
        Ok(Self { config })
    }

    /// Section names present in the file.
    pub fn sections(&self) -> Vec<String> {
        let mut names = self.config.sections();
        names.sort();
        names
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

fn json_scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}
