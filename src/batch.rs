//! Bounded parallel transforms.
//!
//! The engine itself never limits concurrency; this module does. Each batch
//! runs on its own [rayon](https://docs.rs/rayon) pool sized to the configured
//! number of in-flight transforms, which caps the aggregate working-area and
//! output-buffer memory. Results come back in input order.

use crate::engine::{
    Dimensions, EncodedImage, EngineError, ImageEngine, ImageSource, TransformOptions,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run every `(source, options)` pair through `engine` with at most
/// `threads` transforms in flight.
pub fn transform_batch<E>(
    engine: &E,
    jobs: &[(ImageSource, TransformOptions)],
    threads: usize,
) -> Result<Vec<Result<EncodedImage, EngineError>>, BatchError>
where
    E: ImageEngine + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;
    log::debug!(
        "running {} transforms on {} workers ({} engine)",
        jobs.len(),
        pool.current_num_threads(),
        engine.name()
    );
    Ok(pool.install(|| {
        jobs.par_iter()
            .map(|(source, options)| engine.transform(source, options))
            .collect()
    }))
}

/// One file-to-file job, as listed in a batch manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub options: TransformOptions,
}

/// Outcome of a [`BatchJob`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse a JSON array of [`BatchJob`]s.
pub fn parse_jobs(json: &str) -> Result<Vec<BatchJob>, BatchError> {
    Ok(serde_json::from_str(json)?)
}

/// Read every input, transform in parallel, write every successful output.
///
/// A failing job does not stop the others; its report carries the error.
pub fn run_jobs<E>(
    engine: &E,
    jobs: &[BatchJob],
    threads: usize,
) -> Result<Vec<JobReport>, BatchError>
where
    E: ImageEngine + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;
    Ok(pool.install(|| jobs.par_iter().map(|job| run_job(engine, job)).collect()))
}

fn run_job<E>(engine: &E, job: &BatchJob) -> JobReport
where
    E: ImageEngine + ?Sized,
{
    let failed = |error: String| JobReport {
        input: job.input.clone(),
        output: job.output.clone(),
        dimensions: None,
        bytes: None,
        error: Some(error),
    };

    let source = match ImageSource::from_path(&job.input) {
        Ok(source) => source,
        Err(e) => return failed(format!("read {}: {e}", job.input.display())),
    };
    let encoded = match engine.transform(&source, &job.options) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::warn!("{}: {e}", job.input.display());
            return failed(e.to_string());
        }
    };
    if let Err(e) = std::fs::write(&job.output, &encoded.bytes) {
        return failed(format!("write {}: {e}", job.output.display()));
    }

    JobReport {
        input: job.input.clone(),
        output: job.output.clone(),
        dimensions: Some(encoded.dimensions),
        bytes: Some(encoded.len()),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::tests::MockEngine;
    use crate::engine::{EngineSettings, Operation, Quality, RustBackend};
    use crate::test_helpers::*;

    #[test]
    fn batch_preserves_input_order() {
        let engine = MockEngine::new();
        let jobs: Vec<_> = (0..16u8)
            .map(|i| {
                (
                    ImageSource::new(vec![i], format!("{i}.png")),
                    TransformOptions::resize(u32::from(i), 1),
                )
            })
            .collect();

        let results = transform_batch(&engine, &jobs, 4).unwrap();
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap().bytes, vec![i as u8]);
        }
        assert_eq!(engine.get_calls().len(), 16);
    }

    #[test]
    fn batch_keeps_per_job_errors() {
        let engine = RustBackend::default();
        let jobs = vec![
            (png_source(20, 10), TransformOptions::resize(10, 5)),
            (png_source(20, 10), TransformOptions::rotate(90)),
        ];
        let results = transform_batch(&engine, &jobs, 2).unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(EngineError::MethodNotImplemented {
                operation: Operation::Rotate,
                ..
            })
        ));
    }

    #[test]
    fn zero_threads_is_treated_as_one() {
        let engine = MockEngine::new();
        let jobs = vec![(ImageSource::new(vec![1], "a.png"), TransformOptions::default())];
        assert_eq!(transform_batch(&engine, &jobs, 0).unwrap().len(), 1);
    }

    #[test]
    fn parse_jobs_with_default_options() {
        let jobs = parse_jobs(
            r#"[
                {"input": "a.jpg", "output": "a-small.jpg", "options": {"width": 100}},
                {"input": "b.png", "output": "b-copy.png"}
            ]"#,
        )
        .unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].options.width, 100);
        assert_eq!(jobs[1].options, TransformOptions::default());
    }

    #[test]
    fn run_jobs_writes_outputs_and_reports_failures() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = tmp.path().join("good.png");
        std::fs::write(&good, encode_png(40, 30, 7)).unwrap();

        let jobs = vec![
            BatchJob {
                input: good.clone(),
                output: tmp.path().join("good-thumb.png"),
                options: TransformOptions::thumbnail(10, 10),
            },
            BatchJob {
                input: tmp.path().join("missing.png"),
                output: tmp.path().join("missing-out.png"),
                options: TransformOptions::default(),
            },
        ];

        let reports = run_jobs(&RustBackend::default(), &jobs, 2).unwrap();
        assert!(reports[0].is_ok());
        assert_eq!(reports[0].dimensions, Some(Dimensions::new(10, 10)));
        let written = std::fs::read(tmp.path().join("good-thumb.png")).unwrap();
        assert_eq!(decoded_dimensions(&written), (10, 10));

        assert!(!reports[1].is_ok());
        assert!(!tmp.path().join("missing-out.png").exists());
    }

    #[test]
    fn jobs_without_quality_use_engine_quality() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("in.jpg");
        std::fs::write(&input, encode_jpeg(96, 96)).unwrap();
        let job = |name: &str, options: TransformOptions| BatchJob {
            input: input.clone(),
            output: tmp.path().join(name),
            options,
        };

        let low =
            RustBackend::with_settings(EngineSettings::default().with_quality(Quality::new(5)));
        let jobs = vec![
            job("low.jpg", TransformOptions::resize(0, 0)),
            job("override.jpg", TransformOptions::resize(0, 0).with_quality(Quality::new(90))),
        ];
        let reports = run_jobs(&low, &jobs, 1).unwrap();
        assert!(reports.iter().all(JobReport::is_ok));

        let default_jobs = vec![job("default.jpg", TransformOptions::resize(0, 0))];
        run_jobs(&RustBackend::default(), &default_jobs, 1).unwrap();

        let read = |name: &str| std::fs::read(tmp.path().join(name)).unwrap();
        assert!(read("low.jpg").len() < read("default.jpg").len());
        assert_eq!(read("override.jpg"), read("default.jpg"));
    }
}
