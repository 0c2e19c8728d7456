//! Session command handlers: login, logout, whoami, watch.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use raasta_core::{AppEvent, Controller, SessionState};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn prompt(label: &str) -> Result<String, CliError> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

fn format_deadline(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms).map_or_else(
        || ms.to_string(),
        |utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

// ── Login / logout ──────────────────────────────────────────────────

pub async fn login(
    controller: &Controller,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref path) = args.file {
        let doc = util::read_json_file(path)?;
        controller.open_document(doc)?;
    }

    let email = match args.email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let requested = controller.request_login_code(&email).await?;
    if let Some(ref code) = requested.dev_otp {
        tracing::debug!(%code, "development login code");
    }
    if !global.quiet {
        eprintln!("A login code was sent to {}", requested.email);
    }

    let code = match args.code {
        Some(code) => code,
        None => prompt("Code")?,
    };

    let mut events = controller.events();
    let session = controller.verify_login_code(&code).await?;
    controller.flush_sync().await;
    util::print_alerts(&mut events, global);

    if !global.quiet {
        let p = util::palette(global);
        let who = session.email().unwrap_or(&requested.email);
        eprintln!("Signed in as {}", p.paint(p.accent, who));
    }
    Ok(())
}

pub async fn logout(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.logout().await?;
    if !global.quiet {
        eprintln!("Signed out");
    }
    Ok(())
}

// ── Whoami ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SessionReport {
    #[serde(flatten)]
    session: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_secs: Option<u64>,
}

fn session_detail(report: &SessionReport) -> String {
    let Some(email) = report.session.email() else {
        return "Not signed in (guest)".into();
    };
    let mut out = String::new();
    let _ = writeln!(out, "Email:    {email}");
    let state = match report.session {
        SessionState::WarningIssued { .. } => "expiring soon",
        SessionState::Expired { .. } => "expired",
        _ => "signed in",
    };
    let _ = writeln!(out, "State:    {state}");
    if let Some(ms) = report.session.expires_at() {
        let _ = writeln!(out, "Expires:  {}", format_deadline(ms));
    }
    if let Some(secs) = report.remaining_secs {
        let _ = writeln!(
            out,
            "Left:     {}",
            util::format_duration(std::time::Duration::from_secs(secs))
        );
    }
    out.trim_end().to_owned()
}

pub async fn whoami(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let session = controller.bootstrap().await;
    let report = SessionReport {
        remaining_secs: controller.session_remaining().map(|d| d.as_secs()),
        session,
    };

    let out = output::render_single(global.output_format(), &report, session_detail, |r| {
        r.session.email().unwrap_or("guest").to_owned()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Watch ───────────────────────────────────────────────────────────

/// Block until the session expires or the user interrupts.
pub async fn watch(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    // Subscribe first: the monitor armed by bootstrap may fire right away.
    let mut events = controller.events();
    let session = controller.bootstrap().await;

    let Some(email) = session.email().map(str::to_owned) else {
        return Err(CliError::NotSignedIn);
    };
    let p = util::palette(global);
    let Some(deadline) = session.expires_at() else {
        if !global.quiet {
            eprintln!("Signed in as {email}; this session has no expiry deadline.");
        }
        return Ok(());
    };

    if !global.quiet {
        eprintln!(
            "Watching session for {} (expires {}). Press Ctrl-C to stop.",
            p.paint(p.accent, &email),
            format_deadline(deadline)
        );
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(AppEvent::ExpiryWarning { remaining }) => {
                    if !global.quiet {
                        eprintln!(
                            "{} session expires in {}",
                            p.paint(p.warn, "Warning:"),
                            util::format_duration(remaining)
                        );
                    }
                }
                Ok(AppEvent::SessionExpired) => return Err(CliError::SessionExpired),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_detail() {
        let report = SessionReport {
            session: SessionState::Guest,
            remaining_secs: None,
        };
        assert_eq!(session_detail(&report), "Not signed in (guest)");
    }

    #[test]
    fn warning_detail_shows_time_left() {
        let report = SessionReport {
            session: SessionState::WarningIssued {
                email: "sana@example.pk".into(),
                expires_at: 1_700_000_000_000,
            },
            remaining_secs: Some(250),
        };
        let out = session_detail(&report);
        assert!(out.contains("Email:    sana@example.pk"));
        assert!(out.contains("expiring soon"));
        assert!(out.contains("4m 10s"));
    }
}
