#![allow(dead_code)]

use std::collections::BTreeMap;
use logpanes::config::{CommandConfig, ConfigFile, ConfigSection, RawConfigFile};
use logpanes::types::RepaintPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                command: BTreeMap::new(),
            },
        }
    }

    pub fn with_command(mut self, name: &str, command: CommandConfig) -> Self {
        self.config.command.insert(name.to_string(), command);
        self
    }

    pub fn retention_lines(mut self, lines: usize) -> Self {
        self.config.config.retention_lines = lines;
        self
    }

    pub fn repaint(mut self, repaint: RepaintPolicy) -> Self {
        self.config.config.repaint = repaint;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandConfig`.
pub struct CommandConfigBuilder {
    command: CommandConfig,
}

impl CommandConfigBuilder {
    /// Shell command line.
    pub fn shell(line: &str) -> Self {
        Self {
            command: CommandConfig {
                cmd: Some(line.to_string()),
                ..CommandConfig::default()
            },
        }
    }

    /// Program + arguments.
    pub fn argv(argv: &[&str]) -> Self {
        Self {
            command: CommandConfig {
                argv: Some(argv.iter().map(|s| s.to_string()).collect()),
                ..CommandConfig::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.command.title = Some(title.to_string());
        self
    }

    pub fn success_codes(mut self, codes: &[i32]) -> Self {
        self.command.success_codes = Some(codes.to_vec());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> CommandConfig {
        self.command
    }
}
