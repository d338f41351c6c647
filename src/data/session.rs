//! Session telemetry loader
//!
//! Fetches lap-level timing data for one historical session, identified by
//! (season, event, session type). Raw responses are cached on disk so
//! repeated runs against the same weekend stay off the network.

use crate::{DriverId, LapRecord, PredictorError, Result, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A lap row as returned by the timing API
///
/// Durations arrive as `M:SS.mmm` clock strings; any of them may be missing
/// for in/out laps or red-flag interruptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLap {
    pub driver: String,
    pub lap_time: Option<String>,
    pub sector1_time: Option<String>,
    pub sector2_time: Option<String>,
    pub sector3_time: Option<String>,
}

/// Loader for historical session lap data
pub struct SessionLoader {
    client: reqwest::blocking::Client,
    base_url: String,
    /// Optional cache directory for raw JSON responses
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl SessionLoader {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent("gridpred/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        SessionLoader {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: None,
            offline_only: false,
        }
    }

    /// Create loader with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    /// Cache file name for a session identity
    pub fn cache_file_name(session: &SessionConfig) -> String {
        format!(
            "{}_{}_{}.json",
            session.season,
            session.event.to_lowercase().replace(' ', "-"),
            session.session_type
        )
    }

    fn cache_path(&self, session: &SessionConfig) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(Self::cache_file_name(session)))
    }

    fn load_from_cache(&self, session: &SessionConfig) -> Option<String> {
        let path = self.cache_path(session)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    fn save_to_cache(&self, session: &SessionConfig, body: &str) -> Result<()> {
        if let Some(path) = self.cache_path(session) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    /// True if the session is already present in the cache
    pub fn is_cached(&self, session: &SessionConfig) -> bool {
        self.cache_path(session)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    fn session_load_error(session: &SessionConfig, message: String) -> PredictorError {
        PredictorError::SessionLoad {
            season: session.season,
            event: session.event.clone(),
            session_type: session.session_type.clone(),
            message,
        }
    }

    /// Fetch the raw response body, cache-first
    ///
    /// Any failure here is fatal: without sector telemetry the feature set
    /// is unusable, so there is no fallback sample.
    fn fetch_body(&self, session: &SessionConfig) -> Result<String> {
        if let Some(cached) = self.load_from_cache(session) {
            return Ok(cached);
        }

        if self.offline_only {
            return Err(Self::session_load_error(
                session,
                "offline mode and no cached response".to_string(),
            ));
        }

        let url = format!("{}/laps", self.base_url);
        log::info!(
            "Fetching {} {} {} from {}",
            session.season,
            session.event,
            session.session_type,
            url
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("season", session.season.to_string()),
                ("event", session.event.clone()),
                ("session", session.session_type.clone()),
            ])
            .send()
            .map_err(|e| Self::session_load_error(session, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::session_load_error(
                session,
                format!("server returned {}", response.status()),
            ));
        }

        let body = response
            .text()
            .map_err(|e| Self::session_load_error(session, e.to_string()))?;
        self.save_to_cache(session, &body)?;
        Ok(body)
    }

    /// Load all complete laps for a session, durations converted to seconds
    pub fn load(&self, session: &SessionConfig) -> Result<Vec<LapRecord>> {
        let body = self.fetch_body(session)?;
        let raw: Vec<RawLap> = serde_json::from_str(&body)
            .map_err(|e| Self::session_load_error(session, format!("bad payload: {}", e)))?;

        let total = raw.len();
        let laps = complete_laps(raw);
        log::info!("{} laps, {} complete after dropping partials", total, laps.len());
        Ok(laps)
    }
}

/// Parse a `M:SS.mmm` or `SS.mmm` clock string into seconds
pub fn parse_clock(s: &str) -> Result<f64> {
    let s = s.trim();
    let bad = || PredictorError::Parse(format!("invalid clock string: {:?}", s));

    let (minutes, rest) = match s.split_once(':') {
        Some((m, rest)) => (m.parse::<u32>().map_err(|_| bad())?, rest),
        None => (0, s),
    };
    let seconds = rest.parse::<f64>().map_err(|_| bad())?;
    if seconds < 0.0 || (minutes > 0 && seconds >= 60.0) {
        return Err(bad());
    }
    Ok(minutes as f64 * 60.0 + seconds)
}

/// Keep only laps with a full set of timings, converted to seconds
///
/// Mirrors the dropna over the timing columns: a missing or unparseable
/// duration discards the whole lap, never the run.
fn complete_laps(raw: Vec<RawLap>) -> Vec<LapRecord> {
    raw.into_iter()
        .filter_map(|lap| {
            let fields = [
                lap.lap_time.as_deref()?,
                lap.sector1_time.as_deref()?,
                lap.sector2_time.as_deref()?,
                lap.sector3_time.as_deref()?,
            ];
            let mut seconds = [0.0f64; 4];
            for (slot, field) in seconds.iter_mut().zip(fields) {
                match parse_clock(field) {
                    Ok(v) => *slot = v,
                    Err(e) => {
                        log::warn!("Dropping lap for {}: {}", lap.driver, e);
                        return None;
                    }
                }
            }
            Some(LapRecord {
                driver: DriverId::new(&lap.driver),
                lap_time_s: seconds[0],
                sector1_s: seconds[1],
                sector2_s: seconds[2],
                sector3_s: seconds[3],
            })
        })
        .collect()
}
