//! Preference and quota handlers. Both work offline.

use serde::Serialize;

use raasta_core::{Controller, Theme};

use crate::cli::{GlobalOpts, PrefsArgs, PrefsCommand, ThemeArg};
use crate::error::CliError;
use crate::output;

use super::util;

impl From<ThemeArg> for Theme {
    fn from(t: ThemeArg) -> Self {
        match t {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

#[derive(Debug, Serialize)]
struct PrefsReport {
    theme: Theme,
    lang: String,
    lang_is_default: bool,
}

#[derive(Debug, Serialize)]
struct UsageReport {
    admin: bool,
    limit: Option<usize>,
    remaining: Option<usize>,
    window_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_slot_secs: Option<u64>,
}

pub fn handle(
    controller: &Controller,
    args: PrefsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prefs = controller.prefs();
    match args.command {
        PrefsCommand::Show => {
            let stored = prefs.lang();
            let report = PrefsReport {
                theme: prefs.theme(),
                lang_is_default: stored.is_none(),
                lang: stored.unwrap_or_else(|| controller.config().lang.clone()),
            };
            let out = output::render_single(
                global.output_format(),
                &report,
                |r| {
                    let suffix = if r.lang_is_default { " (default)" } else { "" };
                    format!("Theme:    {}\nLanguage: {}{suffix}", r.theme, r.lang)
                },
                |r| r.lang.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PrefsCommand::SetLang { lang } => {
            let lang = lang.trim();
            if lang.is_empty() {
                return Err(CliError::Validation {
                    field: "lang".into(),
                    reason: "language code cannot be empty".into(),
                });
            }
            prefs.set_lang(lang);
            if !global.quiet {
                eprintln!("Language set to {lang}");
            }
            Ok(())
        }

        PrefsCommand::SetTheme { theme } => {
            let theme = Theme::from(theme);
            prefs.set_theme(theme);
            if !global.quiet {
                eprintln!("Theme set to {theme}");
            }
            Ok(())
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
pub fn usage(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let limiter = controller.limiter();
    let policy = limiter.policy();
    let admin = limiter.is_admin();
    let report = UsageReport {
        admin,
        limit: (!admin).then_some(policy.max_generations),
        remaining: limiter.remaining(),
        window_secs: policy.window.as_secs(),
        next_slot_secs: limiter.next_slot_in().map(|d| d.as_secs()),
    };

    let out = output::render_single(
        global.output_format(),
        &report,
        |r| match (r.remaining, r.limit) {
            (Some(remaining), Some(limit)) => {
                let mut line = format!("Generations left this hour: {remaining}/{limit}");
                if let Some(secs) = r.next_slot_secs {
                    line.push_str(&format!(
                        "\nNext slot opens in {}",
                        util::format_duration(std::time::Duration::from_secs(secs))
                    ));
                }
                line
            }
            _ => "Generations: unlimited (admin override)".into(),
        },
        |r| r.remaining.map_or_else(|| "unlimited".into(), |n| n.to_string()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
