//! lms-lessons specific configuration

use clap::Parser;
use lms_common::Result;
use std::path::PathBuf;

/// Command-line and environment options
#[derive(Debug, Parser)]
#[command(name = "lms-lessons", about = "Lesson lifecycle and progress service")]
pub struct Options {
    /// Data directory holding lessons.db (falls back to LMS_DATA_DIR,
    /// then the config file, then the platform default)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Address to listen on
    #[arg(long, env = "LMS_BIND_ADDR", default_value = "127.0.0.1:5731")]
    pub bind_addr: String,

    /// Base URL of the media service collaborator
    #[arg(long, env = "LMS_MEDIA_URL", default_value = "http://127.0.0.1:5732")]
    pub media_url: String,
}

/// Lesson service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub media_url: String,
}

impl Config {
    /// Resolve configuration from parsed options
    pub fn from_options(options: &Options) -> Result<Self> {
        let data_dir =
            lms_common::config::resolve_data_dir(options.data_dir.as_deref(), "LMS_DATA_DIR")?;
        lms_common::config::ensure_data_dir(&data_dir)?;

        let db_path = data_dir.join("lessons.db");

        Ok(Self {
            data_dir,
            db_path,
            bind_addr: options.bind_addr.clone(),
            media_url: options.media_url.clone(),
        })
    }
}
