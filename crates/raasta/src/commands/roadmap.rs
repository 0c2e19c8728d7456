//! Roadmap command handlers: show, skill, progress, toggle, export, import.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use raasta_core::{Controller, Roadmap, Skill, StarRating};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SkillRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Skill")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Growth")]
    growth: String,
    #[tabled(rename = "Salary (PKR)")]
    salary: String,
    #[tabled(rename = "Roles")]
    roles: String,
}

impl From<&Skill> for SkillRow {
    fn from(s: &Skill) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            status: if s.is_completed() { "✓ done" } else { "·" }.into(),
            growth: StarRating::from_rating(s.future_growth_rating).to_string(),
            salary: s.salary_pkr.clone(),
            roles: s.job_roles().join(", "),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProgressReport<'a> {
    name: &'a str,
    completed: usize,
    total: usize,
    percent: u8,
}

// ── Detail renderers ────────────────────────────────────────────────

/// Heading, summary, progress, then one skill table per milestone.
pub(crate) fn roadmap_detail(roadmap: &Roadmap, p: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.paint(p.heading, &roadmap.name));
    if !roadmap.summary.is_empty() {
        let _ = writeln!(out, "{}", roadmap.summary);
    }
    let _ = writeln!(
        out,
        "{} {}/{} skills ({}%)",
        p.paint(p.accent, "Progress:"),
        roadmap.completed_count(),
        roadmap.skill_count(),
        roadmap.progress()
    );

    for (idx, milestone) in roadmap.milestones.iter().enumerate() {
        let _ = writeln!(out);
        let title = format!("{}. {}", idx + 1, milestone.title);
        let _ = writeln!(out, "{}", p.paint(p.heading, &title));
        if milestone.skills.is_empty() {
            let _ = writeln!(out, "{}", p.paint(p.muted, "(no skills)"));
            continue;
        }
        let rows: Vec<SkillRow> = milestone.skills.iter().map(SkillRow::from).collect();
        let _ = writeln!(out, "{}", output::render_table(&rows));
    }
    out.trim_end().to_owned()
}

fn skill_detail(skill: &Skill, p: &Palette) -> String {
    let status = if skill.is_completed() {
        p.paint(p.done, "completed")
    } else {
        skill.status.to_string()
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.paint(p.heading, &skill.title));
    let _ = writeln!(out, "  ID:          {}", skill.id);
    let _ = writeln!(out, "  Status:      {status}");
    let _ = writeln!(
        out,
        "  Growth:      {}",
        StarRating::from_rating(skill.future_growth_rating)
    );
    if !skill.salary_pkr.is_empty() {
        let _ = writeln!(out, "  Salary:      PKR {}", skill.salary_pkr);
    }
    let _ = writeln!(out, "  Roles:       {}", skill.job_roles().join(", "));
    if !skill.description.is_empty() {
        let _ = writeln!(out, "\n{}", skill.description);
    }
    if !skill.resources.is_empty() {
        let _ = writeln!(out, "\n{}", p.paint(p.accent, "Resources"));
        for r in &skill.resources {
            let _ = writeln!(out, "  - {} {}", r.name, p.paint(p.muted, &r.url));
        }
    }
    out.trim_end().to_owned()
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn show(
    controller: &Controller,
    file: Option<&Path>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let roadmap = util::open_roadmap(controller, file, global).await?;
    let p = util::palette(global);
    let out = output::render_single(
        global.output_format(),
        roadmap.as_ref(),
        |r| roadmap_detail(r, &p),
        |r| r.skills().map(|s| s.id.clone()).collect::<Vec<_>>().join("\n"),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn skill(
    controller: &Controller,
    id: &str,
    file: Option<&Path>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::open_roadmap(controller, file, global).await?;
    let skill = controller
        .find_skill(id)
        .ok_or_else(|| CliError::SkillNotFound { id: id.into() })?;

    let p = util::palette(global);
    let out = output::render_single(
        global.output_format(),
        &skill,
        |s| skill_detail(s, &p),
        |s| s.status.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn progress(
    controller: &Controller,
    file: Option<&Path>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let roadmap = util::open_roadmap(controller, file, global).await?;
    let report = ProgressReport {
        name: &roadmap.name,
        completed: roadmap.completed_count(),
        total: roadmap.skill_count(),
        percent: roadmap.progress(),
    };

    let out = output::render_single(
        global.output_format(),
        &report,
        |r| format!("{}: {}/{} skills ({}%)", r.name, r.completed, r.total, r.percent),
        |r| r.percent.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Flip a skill. With `--file` the result is written back to the file;
/// otherwise it is saved to the account.
pub async fn toggle(
    controller: &Controller,
    id: &str,
    file: Option<&Path>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::open_roadmap(controller, file, global).await?;
    let outcome = controller.toggle_skill(id).await?;

    match file {
        Some(path) => std::fs::write(path, controller.export_json()?)?,
        None => controller.flush_sync().await,
    }

    if !global.quiet {
        let p = util::palette(global);
        eprintln!(
            "Skill '{}' marked {} ({}% complete)",
            outcome.skill_id, outcome.status, outcome.progress
        );
        if outcome.completion_reached {
            eprintln!(
                "{}",
                p.paint(
                    p.done,
                    "Congratulations! You've completed every skill on your roadmap."
                )
            );
        }
    }
    Ok(())
}

pub async fn export(
    controller: &Controller,
    path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::open_roadmap(controller, None, global).await?;
    std::fs::write(path, controller.export_json()?)?;
    if !global.quiet {
        eprintln!("Roadmap exported to {}", path.display());
    }
    Ok(())
}

pub async fn import(
    controller: &Controller,
    path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(path)?;
    let session = controller.bootstrap().await;
    let roadmap = controller.restore_from_str(&raw).await?;
    controller.flush_sync().await;

    if !global.quiet {
        eprintln!(
            "Imported '{}' ({}% complete)",
            roadmap.name,
            roadmap.progress()
        );
        if !session.is_authenticated() {
            let p = util::palette(global);
            eprintln!(
                "{}",
                p.paint(p.muted, "Not signed in: run `raasta login --file <path>` to keep it.")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Roadmap {
        Roadmap::from_document(json!({
            "name": "Data Scientist",
            "summary": "From zero to analyst",
            "milestones": [
                { "title": "Foundations", "skills": [
                    { "id": 1, "title": "Python", "future_growth_rating": 4.5,
                      "salary_pkr": "150,000", "status": "completed" },
                    { "id": "2", "title": "SQL", "future_growth_rating": 3 }
                ]},
                { "title": "Later", "skills": [] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn detail_lists_milestones_and_progress() {
        let out = roadmap_detail(&sample(), &Palette::new(false));
        assert!(out.starts_with("Data Scientist"));
        assert!(out.contains("1/2 skills (50%)"));
        assert!(out.contains("1. Foundations"));
        assert!(out.contains("★★★★½"));
        assert!(out.contains("General"));
        assert!(out.contains("(no skills)"));
    }

    #[test]
    fn skill_detail_shows_salary_and_roles() {
        let roadmap = sample();
        let python = roadmap.find_skill("1").unwrap();
        let out = skill_detail(python, &Palette::new(false));
        assert!(out.contains("PKR 150,000"));
        assert!(out.contains("Status:      completed"));
    }
}
