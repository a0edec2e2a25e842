//! socialtext - mention markup conversion and element scanning.
//!
//! # Usage
//!
//! ```bash
//! socialtext decode post.txt --dict users.json
//! socialtext encode document.json --dict users.json
//! socialtext --no-urls scan post.txt --dict users.json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use socialtext::config::{
    ConfigFlags, OutputFormat, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use socialtext::editor::SocialEditor;
use socialtext::markup::{self, PostingContent};
use socialtext::range::{TextRange, char_len};
use socialtext::spans::{MentionDictionary, MentionSpan, SpanTable};

/// Convert between display text with mentions and posting markup
#[derive(Parser, Debug)]
#[command(name = "socialtext", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Mention spans cover the separator typed after them
    #[arg(long, global = true)]
    include_trailing_separator: bool,

    /// Reject selection edits across mentions instead of clearing them.
    /// Only saved as a library editing default; no subcommand edits text
    #[arg(long, global = true)]
    keep_overlapped_mentions: bool,

    /// Do not report hashtags
    #[arg(long, global = true)]
    no_hashtags: bool,

    /// Do not report URLs
    #[arg(long, global = true)]
    no_urls: bool,

    /// Do not report mentions
    #[arg(long, global = true)]
    no_mentions: bool,

    /// JSON output style
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Mention dictionary: JSON object keyed by account
    #[arg(long, value_name = "JSON", global = true)]
    dict: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode posting markup into display text and mention spans
    Decode {
        /// Markup file, or `-` for stdin
        #[arg(value_name = "MARKUP_FILE")]
        input: PathBuf,
    },
    /// Encode a display document into posting markup
    Encode {
        /// Document JSON `{text, spans}`, or `-` for stdin
        #[arg(value_name = "DOCUMENT_JSON")]
        input: PathBuf,
    },
    /// List mention, hashtag and URL elements of decoded markup
    Scan {
        /// Markup file, or `-` for stdin
        #[arg(value_name = "MARKUP_FILE")]
        input: PathBuf,
    },
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            include_trailing_separator: self.include_trailing_separator,
            keep_overlapped_mentions: self.keep_overlapped_mentions,
            no_hashtags: self.no_hashtags,
            no_urls: self.no_urls,
            no_mentions: self.no_mentions,
            format: self.format,
            dictionary: self.dict.clone(),
        }
    }
}

/// Display text with spans, as read by `encode` and printed by `decode`.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    text: String,
    #[serde(default)]
    spans: Vec<SpanRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SpanRecord {
    start: usize,
    end: usize,
    account: String,
}

impl From<&MentionSpan> for SpanRecord {
    fn from(span: &MentionSpan) -> Self {
        Self {
            start: span.start(),
            end: span.end(),
            account: span.user.account.clone(),
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_dictionary(path: Option<&Path>) -> Result<MentionDictionary> {
    let Some(path) = path else {
        return Ok(MentionDictionary::new());
    };
    let content = read_input(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid mention dictionary {}", path.display()))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}

fn decode(markup: &str, dict: &MentionDictionary, flags: &ConfigFlags) -> Document {
    let decoded = markup::decode(markup, dict, flags.policy());
    Document {
        spans: decoded.spans.iter().map(SpanRecord::from).collect(),
        text: decoded.text,
    }
}

fn encode(document: &Document, dict: &MentionDictionary) -> Result<PostingContent> {
    let text_len = char_len(&document.text);
    let spans = document
        .spans
        .iter()
        .map(|record| -> Result<MentionSpan> {
            let user = dict
                .get(&record.account)
                .with_context(|| format!("Unknown account {}", record.account))?;
            if !user.active {
                anyhow::bail!("Account {} is inactive and cannot be mentioned", record.account);
            }
            let range = TextRange::new(record.start, record.end)?;
            if range.end() > text_len {
                anyhow::bail!("Span {range} is past the end of the text");
            }
            Ok(MentionSpan::new(range, user.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    let table = SpanTable::from_spans(spans).context("Invalid mention spans")?;
    Ok(markup::to_posting(&document.text, table.iter()))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    let dict = load_dictionary(effective.dictionary.as_deref())?;
    let pretty = effective.pretty();

    let output = match &cli.command {
        Command::Decode { input } => {
            let markup = read_input(input)?;
            to_json(&decode(&markup, &dict, &effective), pretty)?
        }
        Command::Encode { input } => {
            let content = read_input(input)?;
            let document: Document = serde_json::from_str(&content)
                .with_context(|| format!("Invalid document {}", input.display()))?;
            to_json(&encode(&document, &dict)?, pretty)?
        }
        Command::Scan { input } => {
            let markup = read_input(input)?;
            let mut editor = SocialEditor::new(effective.policy());
            editor.load_posting(&markup, &dict);
            to_json(&editor.elements(effective.element_kinds()), pretty)?
        }
    };
    println!("{output}");
    Ok(())
}
