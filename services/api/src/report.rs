use crate::infra::{load_course, parse_score_override};
use clap::Args;
use grade_engine::error::AppError;
use grade_engine::grading::{
    analyze_course, solve_target_score, what_if, AssignmentId, AssignmentRecord, CourseBreakdown,
    TargetSolution, WhatIfOutcome, WhatIfScenario,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct BreakdownArgs {
    /// Course grading data exported as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Emit one CSV row per assignment group instead of the text report
    #[arg(long, conflicts_with = "json")]
    pub(crate) csv: bool,
    /// Emit the full breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// List every assignment under its group
    #[arg(long)]
    pub(crate) list_assignments: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WhatIfArgs {
    /// Course grading data exported as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Hypothetical score as ID=SCORE (repeatable)
    #[arg(long = "score", value_parser = parse_score_override)]
    pub(crate) scores: Vec<(AssignmentId, f64)>,
    /// Percentage assumed on every remaining ungraded assignment
    #[arg(long)]
    pub(crate) assume: Option<f64>,
    /// Emit the outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TargetArgs {
    /// Course grading data exported as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Assignment whose score is solved for
    #[arg(long)]
    pub(crate) assignment: u64,
    /// Desired overall grade (0-100)
    #[arg(long)]
    pub(crate) target: f64,
    /// Emit the solution as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_breakdown(args: BreakdownArgs) -> Result<(), AppError> {
    let course = load_course(&args.input)?;
    let breakdown = analyze_course(&course);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.csv {
        breakdown.write_csv(&mut out)?;
    } else if args.json {
        write_json(&mut out, &breakdown)?;
    } else {
        render_breakdown(&mut out, &breakdown, args.list_assignments)?;
    }
    Ok(())
}

pub(crate) fn run_what_if(args: WhatIfArgs) -> Result<(), AppError> {
    let WhatIfArgs {
        input,
        scores,
        assume,
        json,
    } = args;

    let scenario = scores.into_iter().fold(
        WhatIfScenario {
            assumed_percentage: assume,
            ..WhatIfScenario::default()
        },
        |scenario, (id, score)| scenario.with_score(id, score),
    );
    if scenario.is_empty() {
        return Err(AppError::InvalidArgument(
            "provide at least one --score ID=SCORE or --assume PCT".to_string(),
        ));
    }

    let course = load_course(&input)?;
    let outcome = what_if(&course, &scenario)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        write_json(&mut out, &outcome)?;
    } else {
        render_what_if(&mut out, &outcome)?;
    }
    Ok(())
}

pub(crate) fn run_target(args: TargetArgs) -> Result<(), AppError> {
    let course = load_course(&args.input)?;
    let solution = solve_target_score(&course, args.target, AssignmentId(args.assignment))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        write_json(&mut out, &solution)?;
    } else {
        render_target(&mut out, &solution)?;
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn render_breakdown<W: Write>(
    out: &mut W,
    breakdown: &CourseBreakdown,
    list_assignments: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "Grade breakdown ({} grading)",
        breakdown.policy.label()
    )?;
    writeln!(out, "Current grade: {}", percent(breakdown.current_grade))?;

    for group in &breakdown.groups {
        let weight = if breakdown.policy.uses_weights {
            format!(" [{}%]", group.weight)
        } else {
            String::new()
        };
        writeln!(
            out,
            "- {}{weight}: {} | {} / {} pts | {} of {} graded",
            group.name,
            percent(group.percentage),
            group.earned,
            group.possible,
            group.graded_count,
            group.total_count,
        )?;
        if group.missing_count > 0 || group.late_count > 0 {
            writeln!(
                out,
                "  {} missing | {} late",
                group.missing_count, group.late_count
            )?;
        }
        for dropped in &group.dropped {
            writeln!(out, "  dropped: {}", assignment_line(dropped))?;
        }
        if list_assignments {
            for record in &group.assignments {
                writeln!(out, "  * {}", assignment_line(record))?;
            }
        }
    }

    let analysis = &breakdown.analysis;
    if let Some(strongest) = &analysis.strongest_group {
        writeln!(
            out,
            "Strongest group: {} ({}%)",
            strongest.name, strongest.percentage
        )?;
    }
    if let Some(weakest) = &analysis.weakest_group {
        writeln!(
            out,
            "Weakest group: {} ({}%)",
            weakest.name, weakest.percentage
        )?;
    }
    writeln!(
        out,
        "Ungraded points remaining: {}",
        analysis.ungraded_points_remaining
    )?;
    writeln!(
        out,
        "If remaining work scores 100% / 80% / 60%: {} / {} / {}",
        percent(analysis.grade_if_perfect),
        percent(analysis.grade_if_80),
        percent(analysis.grade_if_60),
    )
}

fn render_what_if<W: Write>(out: &mut W, outcome: &WhatIfOutcome) -> io::Result<()> {
    writeln!(
        out,
        "Current grade: {} -> projected {} ({})",
        percent(outcome.current_grade),
        percent(outcome.projected_grade),
        signed(outcome.change),
    )?;

    writeln!(out, "Scores applied:")?;
    for applied in &outcome.scenarios_applied {
        writeln!(
            out,
            "  - {} ({}): {} / {} [{:?}]",
            applied.assignment_name,
            applied.group_name,
            applied.hypothetical_score,
            applied.points_possible,
            applied.source,
        )?;
    }

    for impact in &outcome.group_impacts {
        writeln!(
            out,
            "  {}: {} -> {} ({})",
            impact.name,
            percent(impact.current_percentage),
            percent(impact.projected_percentage),
            signed(impact.change),
        )?;
    }
    for warning in &outcome.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    for note in &outcome.notes {
        writeln!(out, "note: {note}")?;
    }
    Ok(())
}

fn render_target<W: Write>(out: &mut W, solution: &TargetSolution) -> io::Result<()> {
    writeln!(
        out,
        "Target {}% via {} ({} pts)",
        solution.target_grade, solution.assignment_name, solution.points_possible
    )?;
    match solution.needed_score {
        Some(needed) => writeln!(
            out,
            "Needed score: {needed} ({})",
            percent(solution.needed_percentage)
        )?,
        None => writeln!(out, "Needed score: out of reach")?,
    }
    writeln!(out, "Achievable: {}", if solution.achievable { "yes" } else { "no" })?;
    if let Some(note) = &solution.note {
        writeln!(out, "{note}")?;
    }
    Ok(())
}

fn assignment_line(record: &AssignmentRecord) -> String {
    let score = match record.score() {
        Some(score) => format!("{score} / {}", record.points_possible),
        None => format!("- / {}", record.points_possible),
    };
    let due = record
        .due_at
        .map(|due| format!(" (due {})", due.format("%Y-%m-%d")))
        .unwrap_or_default();
    let mut flags = String::new();
    if record.late {
        flags.push_str(" late");
    }
    if record.missing {
        flags.push_str(" missing");
    }
    format!("{} {score}{due}{flags}", record.name)
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn signed(value: Option<f64>) -> String {
    match value {
        Some(value) if value >= 0.0 => format!("+{value}"),
        Some(value) => value.to_string(),
        None => "n/a".to_string(),
    }
}
