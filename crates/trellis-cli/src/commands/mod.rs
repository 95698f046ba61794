//! CLI command implementations.

pub mod inspect;
pub mod lower;

use comfy_table::Cell;
use serde::Serialize;
use trellis::JobRequest;
use trellis::plan::explain::{describe, describe_sink};

use crate::output::{self, Format};

/// One operator row, sink included.
#[derive(Serialize)]
struct OperatorRow {
    index: usize,
    operator: String,
    channel: String,
    description: String,
}

/// Summary of a lowered or decoded job.
#[derive(Serialize)]
struct JobSummary {
    source: Option<String>,
    job_id: u64,
    name: String,
    workers: u32,
    operators: Vec<OperatorRow>,
    frame: Option<String>,
    frame_bytes: Option<usize>,
}

impl JobSummary {
    fn new(request: &JobRequest, source: Option<String>) -> Self {
        let config = request.config();
        let mut operators: Vec<OperatorRow> = request
            .plan()
            .iter()
            .enumerate()
            .map(|(index, op)| OperatorRow {
                index,
                operator: op.op.name().to_string(),
                channel: op.channel.to_string(),
                description: describe(op),
            })
            .collect();
        let sink = request.sink();
        operators.push(OperatorRow {
            index: operators.len(),
            operator: sink.name().to_string(),
            channel: sink.channel.to_string(),
            description: describe_sink(sink),
        });

        Self {
            source,
            job_id: config.job_id().as_u64(),
            name: config.name().to_string(),
            workers: config.workers(),
            operators,
            frame: None,
            frame_bytes: None,
        }
    }

    fn with_frame(mut self, path: String, bytes: usize) -> Self {
        self.frame = Some(path);
        self.frame_bytes = Some(bytes);
        self
    }
}

/// Prints one job in table form: properties, operators, and the plan tree.
fn print_job_table(summary: &JobSummary, request: &JobRequest, quiet: bool) {
    if quiet {
        return;
    }
    let mut items = vec![
        ("Job", summary.job_id.to_string()),
        ("Name", summary.name.clone()),
        ("Workers", summary.workers.to_string()),
        ("Operators", request.plan().len().to_string()),
        ("Sink", request.sink().name().to_string()),
    ];
    if let Some(source) = &summary.source {
        items.insert(0, ("Source", source.clone()));
    }
    if let (Some(frame), Some(bytes)) = (&summary.frame, summary.frame_bytes) {
        items.push(("Frame", format!("{frame} ({bytes} bytes)")));
    }
    output::print_key_value_table(&items, quiet);

    let mut table = output::create_table();
    output::add_header(&mut table, &["#", "Operator", "Channel", "Description"]);
    for row in &summary.operators {
        table.add_row(vec![
            Cell::new(row.index),
            Cell::new(&row.operator),
            Cell::new(&row.channel),
            Cell::new(&row.description),
        ]);
    }
    println!("{table}");
    println!("{request}");
}

/// Prints jobs in the selected format.
fn print_jobs(jobs: &[(JobSummary, &JobRequest)], format: Format, quiet: bool) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            let summaries: Vec<&JobSummary> = jobs.iter().map(|(s, _)| s).collect();
            output::print_json(&summaries, quiet)
        }
        Format::Table => {
            for (summary, request) in jobs {
                print_job_table(summary, request, quiet);
            }
            Ok(())
        }
    }
}
