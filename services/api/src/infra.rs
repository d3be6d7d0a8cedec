use grade_engine::error::AppError;
use grade_engine::grading::{AssignmentId, CourseGrades};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read course grading data previously exported by the LMS client.
pub(crate) fn load_course(path: &Path) -> Result<CourseGrades, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Parse an `ID=SCORE` pair such as `401=118.5`.
pub(crate) fn parse_score_override(raw: &str) -> Result<(AssignmentId, f64), String> {
    let (id, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=SCORE, got '{raw}'"))?;
    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("invalid assignment id in '{raw}' ({err})"))?;
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid score in '{raw}' ({err})"))?;
    if !score.is_finite() {
        return Err(format!("score in '{raw}' must be a finite number"));
    }
    Ok((AssignmentId(id), score))
}
