//! Traversal lowering command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use trellis::{JobConfig, JobRequest, LoweringOptions, Translator, Traversal};

use super::{JobSummary, print_jobs};
use crate::OutputFormat;
use crate::output;

/// Arguments of `trellis lower`.
#[derive(Args)]
pub struct LowerArgs {
    /// Traversal files (JSON)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Job id of the first file; later files get consecutive ids
    #[arg(long, default_value_t = 1)]
    pub job_id: u64,

    /// Job name (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Number of workers
    #[arg(long, default_value_t = 1)]
    pub workers: u32,

    /// Iteration bound for repeat() without times()
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Keep order() and limit() as separate operators
    #[arg(long)]
    pub no_top_k: bool,

    /// Directory to write `<stem>.frame` job frames into (input stems must be distinct)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "job".to_string(), |s| s.to_string_lossy().into_owned())
}

fn read_traversal(path: &Path) -> Result<Traversal> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid traversal document", path.display()))
}

fn job_config(args: &LowerArgs, index: usize, path: &Path) -> Result<JobConfig> {
    let job_id = args.job_id + index as u64;
    let name = args.name.clone().unwrap_or_else(|| file_stem(path));
    let pairs = [
        JobConfig::KEY_JOB_ID.to_string(),
        job_id.to_string(),
        JobConfig::KEY_JOB_NAME.to_string(),
        name,
        JobConfig::KEY_WORKERS.to_string(),
        args.workers.to_string(),
    ];
    Ok(JobConfig::from_kv(&pairs)?)
}

fn options(args: &LowerArgs) -> Result<LoweringOptions> {
    let mut options = LoweringOptions::default().with_top_by_fusion(!args.no_top_k);
    if let Some(n) = args.max_iterations {
        options = options.with_max_loop_iterations(n)?;
    }
    Ok(options)
}

/// Fails if two inputs would write the same `<stem>.frame`.
fn check_frame_names(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(files.len());
    for path in files {
        let stem = file_stem(path);
        if let Some(first) = seen.get(&stem) {
            bail!(
                "{} and {} would both write {stem}.frame",
                first.display(),
                path.display()
            );
        }
        seen.insert(stem, path);
    }
    Ok(())
}

fn write_frame(dir: &Path, source: &Path, request: &JobRequest) -> Result<(PathBuf, usize)> {
    let frame = request.encode_frame()?;
    let path = dir.join(format!("{}.frame", file_stem(source)));
    std::fs::write(&path, &frame)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok((path, frame.len()))
}

/// Run the lower command.
pub fn run(args: &LowerArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let translator = Translator::with_options(options(args)?);

    let mut queries = Vec::with_capacity(args.files.len());
    for (index, path) in args.files.iter().enumerate() {
        queries.push((read_traversal(path)?, job_config(args, index, path)?));
    }

    if let Some(dir) = &args.output {
        check_frame_names(&args.files)?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let results = translator.lower_batch(&queries);
    let mut lowered = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (path, result) in args.files.iter().zip(results) {
        match result {
            Ok(request) => {
                tracing::info!(
                    path = %path.display(),
                    job = %request.config().job_id(),
                    operators = request.plan().len(),
                    "lowered traversal"
                );
                lowered.push((path, request));
            }
            Err(e) => {
                failures += 1;
                output::error(&format!("{}: {e}", path.display()));
            }
        }
    }

    let mut jobs = Vec::with_capacity(lowered.len());
    for (path, request) in &lowered {
        let mut summary = JobSummary::new(request, Some(path.display().to_string()));
        if let Some(dir) = &args.output {
            let (frame, bytes) = write_frame(dir, path, request)?;
            summary = summary.with_frame(frame.display().to_string(), bytes);
        }
        jobs.push((summary, request));
    }
    print_jobs(&jobs, format.into(), quiet)?;

    if failures > 0 {
        bail!("{failures} of {} traversals failed to lower", args.files.len());
    }
    if let Some(dir) = &args.output {
        output::success(
            &format!("wrote {} frame(s) to {}", jobs.len(), dir.display()),
            quiet,
        );
    } else {
        output::status(&format!("lowered {} traversal(s)", jobs.len()), quiet);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP: &str = r#"{
        "source": {"v": []},
        "steps": [
            {"has": {"key": "age", "predicate": {"gt": {"Int64": 17}}}},
            {"repartition": "id"},
            {"groupCount": {"key": {"token": "label"}}}
        ]
    }"#;

    fn args(files: Vec<PathBuf>, output: Option<PathBuf>) -> LowerArgs {
        LowerArgs {
            files,
            job_id: 10,
            name: None,
            workers: 4,
            max_iterations: None,
            no_top_k: false,
            output,
        }
    }

    #[test]
    fn test_lower_writes_frames() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("adults.json");
        std::fs::write(&input, ROUND_TRIP).unwrap();
        let out = dir.path().join("frames");

        run(&args(vec![input.clone()], Some(out.clone())), OutputFormat::Json, true).unwrap();

        let frame = std::fs::read(out.join("adults.frame")).unwrap();
        let request = JobRequest::decode_frame(&frame).unwrap();
        assert_eq!(request.config().job_id().as_u64(), 10);
        assert_eq!(request.config().name(), "adults");
        assert_eq!(request.config().workers(), 4);
        assert_eq!(request.operators().len(), 2);

        let expected = trellis::lower(
            &read_traversal(&input).unwrap(),
            job_config(&args(vec![input.clone()], None), 0, &input).unwrap(),
        )
        .unwrap();
        assert_eq!(request, expected);
    }

    #[test]
    fn test_lower_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, ROUND_TRIP).unwrap();
        std::fs::write(&bad, r#"{"source": {"v": []}, "steps": ["drop"]}"#).unwrap();

        let err = run(&args(vec![good, bad], None), OutputFormat::Table, true).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }

    #[test]
    fn test_lower_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        std::fs::write(&input, "{").unwrap();
        let err = run(&args(vec![input], None), OutputFormat::Table, true).unwrap_err();
        assert!(format!("{err:#}").contains("not a valid traversal document"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("q.json");
        std::fs::write(&input, ROUND_TRIP).unwrap();
        let mut bad = args(vec![input], None);
        bad.workers = 0;
        assert!(run(&bad, OutputFormat::Table, true).is_err());
    }

    #[test]
    fn test_same_stem_inputs_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("q.json"), ROUND_TRIP).unwrap();
        std::fs::write(b.join("q.json"), ROUND_TRIP).unwrap();
        let out = dir.path().join("frames");

        let files = vec![a.join("q.json"), b.join("q.json")];
        let err = run(&args(files.clone(), Some(out.clone())), OutputFormat::Json, true).unwrap_err();
        assert!(err.to_string().contains("would both write q.frame"));
        assert!(!out.exists());

        run(&args(files, None), OutputFormat::Json, true).unwrap();
    }
}
