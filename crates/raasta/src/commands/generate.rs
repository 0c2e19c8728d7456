//! `raasta generate`: run the questionnaire through the service.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use raasta_core::{Controller, GenerationRequest};

use crate::cli::{GenerateArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{roadmap, util};

const LOADING_MESSAGES: [&str; 10] = [
    "Analyzing local job market trends...",
    "Consulting AI career strategists...",
    "Mapping skills to opportunities...",
    "Tailoring your personalized path...",
    "Identifying key growth areas...",
    "Compiling relevant resources...",
    "Forecasting salary expectations...",
    "Structuring your milestones...",
    "Finalizing your career blueprint...",
    "Almost there, preparing your Raasta...",
];

const MESSAGE_ROTATION: Duration = Duration::from_secs(2);

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}") {
        pb.set_style(style);
    }
    pb.set_message(LOADING_MESSAGES[0]);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub async fn handle(
    controller: &Controller,
    args: GenerateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.goal.trim().is_empty() {
        return Err(CliError::Validation {
            field: "goal".into(),
            reason: "a career goal is required".into(),
        });
    }

    // Identity decides whether the result is saved to the account.
    controller.bootstrap().await;

    let request = GenerationRequest {
        goal: args.goal,
        interests: args.interests,
        education: args.education,
        location: args.location,
        lang: global.lang.clone(),
    };

    let pb = spinner(global.quiet);
    let generation = controller.generate(request);
    tokio::pin!(generation);

    let mut rotation = tokio::time::interval(MESSAGE_ROTATION);
    rotation.tick().await;
    let mut idx = 0;
    let result = loop {
        tokio::select! {
            res = &mut generation => break res,
            _ = rotation.tick() => {
                idx = (idx + 1) % LOADING_MESSAGES.len();
                pb.set_message(LOADING_MESSAGES[idx]);
            }
        }
    };
    pb.finish_and_clear();

    let generated = result?;
    if let Some(ref path) = args.save_to {
        std::fs::write(path, generated.to_pretty_json()?)?;
        if !global.quiet {
            eprintln!("Roadmap written to {}", path.display());
        }
    }
    controller.flush_sync().await;

    let p = util::palette(global);
    let out = output::render_single(
        global.output_format(),
        generated.as_ref(),
        |r| roadmap::roadmap_detail(r, &p),
        |r| r.skills().map(|s| s.id.clone()).collect::<Vec<_>>().join("\n"),
    );
    output::print_output(&out, global.quiet);

    if !controller.session().is_authenticated() && args.save_to.is_none() && !global.quiet {
        eprintln!(
            "{}",
            p.paint(
                p.muted,
                "Not signed in: pass --save-to to keep this roadmap, then `raasta login --file`."
            )
        );
    }
    Ok(())
}
