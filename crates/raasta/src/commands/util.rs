//! Shared helpers for command handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};

use raasta_core::{AppEvent, Controller, Roadmap};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Palette};

/// Read and parse a roadmap JSON file. Unparseable files are reported the
/// same way as files without milestones.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidRoadmap {
        reason: format!("invalid JSON: {e}"),
    })
}

/// Make a roadmap current: from `file` when given, otherwise from the
/// account's saved data.
pub async fn open_roadmap(
    controller: &Controller,
    file: Option<&Path>,
    global: &GlobalOpts,
) -> Result<Arc<Roadmap>, CliError> {
    if let Some(path) = file {
        let doc = read_json_file(path)?;
        return Ok(controller.open_document(doc)?);
    }

    let session = controller.bootstrap().await;
    if !session.is_authenticated() && !controller.prefs().visited_before() {
        if !global.quiet {
            let p = palette(global);
            eprintln!(
                "{}\n{}",
                p.paint(p.heading, "Welcome to Smart Raasta!"),
                p.paint(
                    p.muted,
                    "Roadmaps stay on this machine until you sign in. Run: raasta login"
                ),
            );
        }
        controller.prefs().mark_visited();
    }
    controller.roadmap().ok_or(CliError::NoRoadmap)
}

/// Print every alert already queued on `events` to stderr.
pub fn print_alerts(events: &mut broadcast::Receiver<AppEvent>, global: &GlobalOpts) {
    let p = palette(global);
    loop {
        match events.try_recv() {
            Ok(AppEvent::Alert(alert)) => {
                if !global.quiet {
                    eprintln!("{} {}", p.paint(p.warn, &alert.title), alert.message);
                }
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

pub fn palette(global: &GlobalOpts) -> Palette {
    Palette::new(output::should_color(global.color_mode()))
}

/// `1h 05m`, `4m 10s`, `12s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn durations_pick_largest_unit() {
        assert_eq!(format_duration(Duration::from_secs(3900)), "1h 05m");
        assert_eq!(format_duration(Duration::from_secs(250)), "4m 10s");
        assert_eq!(format_duration(Duration::from_secs(12)), "12s");
    }

    #[test]
    fn malformed_file_is_invalid_roadmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, CliError::InvalidRoadmap { .. }));
    }
}
