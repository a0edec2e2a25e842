use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::policy::EditPolicy;
use crate::scanner::ElementKinds;

/// How the command line prints JSON.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Compact,
    Pretty,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub include_trailing_separator: bool,
    pub keep_overlapped_mentions: bool,
    pub no_hashtags: bool,
    pub no_urls: bool,
    pub no_mentions: bool,
    pub format: Option<OutputFormat>,
    pub dictionary: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            include_trailing_separator: self.include_trailing_separator
                || other.include_trailing_separator,
            keep_overlapped_mentions: self.keep_overlapped_mentions
                || other.keep_overlapped_mentions,
            no_hashtags: self.no_hashtags || other.no_hashtags,
            no_urls: self.no_urls || other.no_urls,
            no_mentions: self.no_mentions || other.no_mentions,
            format: other.format.or(self.format),
            dictionary: other
                .dictionary
                .clone()
                .or_else(|| self.dictionary.clone()),
        }
    }

    /// Editing policy these flags select.
    pub const fn policy(&self) -> EditPolicy {
        EditPolicy {
            include_trailing_separator: self.include_trailing_separator,
            clear_overlapped_mentions_on_selection_edit: !self.keep_overlapped_mentions,
        }
    }

    /// Element kinds left enabled.
    pub const fn element_kinds(&self) -> ElementKinds {
        ElementKinds {
            mention: !self.no_mentions,
            hashtag: !self.no_hashtags,
            url: !self.no_urls,
        }
    }

    pub fn pretty(&self) -> bool {
        self.format == Some(OutputFormat::Pretty)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("socialtext").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("socialtext")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("socialtext").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("socialtext")
                .join("config");
        }
    }

    PathBuf::from(".socialtextrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".socialtextrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# socialtext defaults (saved with --save)".to_string());
    if flags.include_trailing_separator {
        lines.push("--include-trailing-separator".to_string());
    }
    if flags.keep_overlapped_mentions {
        lines.push("--keep-overlapped-mentions".to_string());
    }
    if flags.no_hashtags {
        lines.push("--no-hashtags".to_string());
    }
    if flags.no_urls {
        lines.push("--no-urls".to_string());
    }
    if flags.no_mentions {
        lines.push("--no-mentions".to_string());
    }
    if let Some(format) = flags.format {
        let format_str = match format {
            OutputFormat::Compact => "compact",
            OutputFormat::Pretty => "pretty",
        };
        lines.push(format!("--format {format_str}"));
    }
    if let Some(path) = &flags.dictionary {
        lines.push(format!("--dict {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--include-trailing-separator" {
            flags.include_trailing_separator = true;
        } else if token == "--keep-overlapped-mentions" {
            flags.keep_overlapped_mentions = true;
        } else if token == "--no-hashtags" {
            flags.no_hashtags = true;
        } else if token == "--no-urls" {
            flags.no_urls = true;
        } else if token == "--no-mentions" {
            flags.no_mentions = true;
        } else if token == "--format" {
            if let Some(next) = tokens.get(i + 1) {
                flags.format = parse_format(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--format=") {
            flags.format = parse_format(value);
        } else if token == "--dict" {
            if let Some(next) = tokens.get(i + 1) {
                flags.dictionary = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--dict=") {
            flags.dictionary = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_format(s: &str) -> Option<OutputFormat> {
    match s {
        "compact" => Some(OutputFormat::Compact),
        "pretty" => Some(OutputFormat::Pretty),
        _ => None,
    }
}
