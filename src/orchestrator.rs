use std::io;
use std::path::Path;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::collaborator::{FileState, MediaHandle, VideoModel};
use crate::config::GraderConfig;
use crate::error::{GradeError, GradeResult};
use crate::models::GradeReport;
use crate::normalize::{normalize_compliance, normalize_quality};
use crate::payout::payout_result;
use crate::prompts::{COMPLIANCE_PROMPT, QUALITY_PROMPT};
use crate::scoring::compute_final_score;

/// Runs one grading request end to end against a [`VideoModel`].
pub struct Grader<M> {
    model: M,
    config: GraderConfig,
}

impl<M: VideoModel> Grader<M> {
    pub fn new(model: M, config: GraderConfig) -> Self {
        Self { model, config }
    }

    /// Upload, wait for processing, run both evaluations, then score.
    /// Any failure aborts the whole request.
    pub async fn grade(&self, video: &Path) -> GradeResult<GradeReport> {
        let request_id = Uuid::new_v4();
        let span = info_span!("grade", %request_id, video = %video.display());

        async move {
            if !video.is_file() {
                return Err(GradeError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("video to evaluate not found: {}", video.display()),
                )));
            }

            info!("uploading video");
            let handle = self.model.upload(video).await?;
            self.wait_until_active(&handle).await?;

            let model = self.config.gemini.model.as_str();
            info!(model, file = %handle.name, "running quality and compliance evaluations");
            let (quality_text, compliance_text) = tokio::try_join!(
                self.model.generate(model, &handle, QUALITY_PROMPT),
                self.model.generate(model, &handle, COMPLIANCE_PROMPT),
            )?;

            let report =
                assemble_report(request_id, &quality_text, &compliance_text, model, &self.config)?;
            info!(
                tier = %report.calculation.tier,
                overall = report.calculation.overall,
                payout = report.payout.payout,
                "video graded"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Poll until the asset is ACTIVE. FAILED and timeout are both fatal.
    pub async fn wait_until_active(&self, handle: &MediaHandle) -> GradeResult<()> {
        let polling = self.config.polling;
        let started = Instant::now();

        loop {
            let state = self.model.file_state(handle).await?;
            debug!(file = %handle.name, %state, "upload state");

            match state {
                FileState::Active => return Ok(()),
                FileState::Failed => {
                    return Err(GradeError::UploadFailed {
                        name: handle.name.clone(),
                        message: format!("file failed to process (state={state})"),
                    })
                }
                _ if started.elapsed() > polling.timeout() => {
                    return Err(GradeError::UploadTimeout {
                        name: handle.name.clone(),
                        waited: started.elapsed(),
                        last_state: state.to_string(),
                    })
                }
                _ => sleep(polling.interval()).await,
            }
        }
    }
}

/// Normalize both model outputs and turn them into a report.
pub fn assemble_report(
    request_id: Uuid,
    quality_text: &str,
    compliance_text: &str,
    model: &str,
    config: &GraderConfig,
) -> GradeResult<GradeReport> {
    let evaluation = normalize_quality(quality_text)?;
    let compliance = normalize_compliance(compliance_text)?;

    let score = compute_final_score(
        &evaluation.scores,
        compliance.compliance_risk,
        evaluation.ai_generated,
        compliance.critical_violation,
        &config.weights,
    );
    let payout = payout_result(&score, &config.payout);

    Ok(GradeReport {
        request_id,
        graded_at: Utc::now(),
        model: model.to_string(),
        evaluation,
        compliance,
        calculation: score.breakdown,
        payout,
    })
}
