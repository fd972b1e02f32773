use clap::Parser;
use ecg_quicktest::{read_bulk, telemetry, BulkError, QuickTestResult};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use tracing::warn;

#[derive(Parser)]
struct Args {
    path: String,
    /// マトリクスバージョン（省略時は既定のバージョン）
    #[arg(long)]
    matrix_version: Option<String>,
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    participant_type: &'a str,
    complete: bool,
    #[serde(flatten)]
    result: QuickTestResult,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    telemetry::init(&args.log_level)?;

    let reader = BufReader::new(File::open(&args.path).map_err(BulkError::from)?);
    for row in read_bulk(reader, args.matrix_version.as_deref())? {
        match row {
            Ok((id, test)) => {
                let row = Row {
                    id: &id,
                    participant_type: test.participant_type(),
                    complete: test.is_complete(),
                    result: test.result(),
                };
                println!("{}", serde_json::to_string(&row)?);
            }
            Err(e) => {
                warn!(error = %e, "skipped row");
            }
        }
    }
    Ok(())
}
