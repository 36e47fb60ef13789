//! Command-line configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Terminal anatomy explorer backed by the ScanSpectrum scan service
#[derive(Parser, Debug, Clone)]
#[command(name = "scan-spectrum")]
#[command(about = "Upload a scan, explore the detected organ, listen to its narration")]
#[command(version)]
pub struct AppConfig {
    /// Base URL of the scan backend
    #[arg(long, default_value = "http://localhost:5000", env = "SCAN_SPECTRUM_API_URL")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Offline organ data to use instead of the embedded dataset
    #[arg(long)]
    pub fallback_data: Option<PathBuf>,

    /// Speech synthesis program (espeak-ng compatible)
    #[arg(long, default_value = "espeak-ng")]
    pub speech_program: String,

    /// Do not open an audio output device
    #[arg(long)]
    pub mute: bool,

    /// Directory for the rotating log files
    #[arg(long, default_value = ".logs")]
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::try_parse_from(["scan-spectrum"]).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.speech_program, "espeak-ng");
        assert_eq!(config.log_dir, PathBuf::from(".logs"));
        assert!(!config.mute);
        assert!(config.fallback_data.is_none());
    }

    #[test]
    fn test_flags() {
        let config = AppConfig::try_parse_from([
            "scan-spectrum",
            "--api-url",
            "http://scanner.local:8080",
            "--timeout-secs",
            "0",
            "--fallback-data",
            "organs.json",
            "--mute",
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://scanner.local:8080");
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.fallback_data, Some(PathBuf::from("organs.json")));
        assert!(config.mute);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(AppConfig::try_parse_from(["scan-spectrum", "--volume", "3"]).is_err());
    }
}
