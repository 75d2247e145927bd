pub mod handle;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod schedule_reader;

use log::{debug, info, warn};

use round_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::handle::TableHandle;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("The table {path} does not exist"))]
    NotFound { path: String },
    #[snafu(display("Error reading file {path}"))]
    ReadingTable {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    ReadingCsv {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unknown input type {input_type:?} (expected csv or xlsx)"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid schedule"))]
    Schedule { source: AggregationError },
    #[snafu(display("The table {path} cannot be used"))]
    Aggregation {
        source: AggregationError,
        path: String,
    },
    #[snafu(display("No table has been loaded yet"))]
    NoTableLoaded {},
    #[snafu(display("Error writing to {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The results differ from the reference {path}"))]
    ReferenceMismatch { path: String },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// The supported file formats for the tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

impl InputType {
    /// Uses the explicit type if provided, or the extension of the file.
    pub fn detect(path: &str, input_type: Option<&str>) -> TallyResult<InputType> {
        let t = match input_type {
            Some(t) => t.to_lowercase(),
            None => Path::new(path)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| "csv".to_string()),
        };
        match t.as_str() {
            "csv" => Ok(InputType::Csv),
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            x => UnknownInputTypeSnafu { input_type: x }.fail(),
        }
    }
}

/// How to read the tables.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReadOptions {
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub layout: TableLayout,
}

pub fn read_table(path: &str, options: &ReadOptions) -> TallyResult<VoteTable> {
    ensure!(
        Path::new(path).is_file(),
        NotFoundSnafu {
            path: path.to_string()
        }
    );
    let input_type = InputType::detect(path, options.input_type.as_deref())?;
    info!("Attempting to read table {:?} as {:?}", path, input_type);
    match input_type {
        InputType::Csv => io_csv::read_csv_table(path),
        InputType::Xlsx => io_excel::read_excel_table(path, options.excel_worksheet_name.as_deref()),
    }
}

/// The name under which a contestant is displayed: any trailing ` (series)`
/// is removed.
pub fn display_name(name: &str) -> &str {
    match name.find(" (") {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// The JSON payload for a query by rounds.
///
/// The votes of each contestant are keyed by round, in the order of the rounds.
pub fn build_payload_js(season: &str, res: &VotesByRounds) -> JSValue {
    let mut votes_data: Vec<JSValue> = Vec::new();
    for cv in res.votes.iter() {
        let mut rounds: JSMap<String, JSValue> = JSMap::new();
        for (round, vote) in res.rounds.iter().zip(cv.votes.iter()) {
            rounds.insert(round.clone(), json!(vote));
        }
        votes_data.push(json!({
            "character": display_name(&cv.contestant.name),
            "series": cv.contestant.series,
            "rounds": rounds
        }));
    }

    let mut counts: JSMap<String, JSValue> = JSMap::new();
    for (round, count) in res.headcounts.iter() {
        counts.insert(round.clone(), json!(count));
    }

    json!({
        "season": season,
        "vote_rounds": res.rounds,
        "votes_data": votes_data,
        "participating_counts": counts
    })
}

/// The JSON listing of the contestants, in the order of the table.
pub fn build_contestants_js(season: &str, infos: &[ContestantInfo]) -> JSValue {
    let contestants: Vec<JSValue> = infos
        .iter()
        .map(|info| {
            json!({
                "character": info.contestant.name,
                "ip": info.contestant.series,
                "avatar": info.avatar
            })
        })
        .collect();
    json!({
        "season": season,
        "characters": contestants
    })
}

pub fn read_reference(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn write_output(out: &Option<String>, contents: &str) -> TallyResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", contents);
            Ok(())
        }
        Some("") => Ok(()),
        Some(path) => fs::write(path, contents).context(WritingSnafu { path }),
    }
}

pub fn run_tally(args: &Args) -> TallyResult<()> {
    let registry = match &args.schedule {
        Some(p) => schedule_reader::read_registry(p)?,
        None => schedule_reader::builtin_registry()?,
    };
    debug!("run_tally: seasons: {:?}", registry.seasons());

    let options = ReadOptions {
        input_type: args.input_type.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
        layout: TableLayout::default(),
    };
    let handle = TableHandle::new(registry, options);
    handle.reload(&args.input, args.name.as_deref())?;
    let current = handle.current()?;
    let aggregator = &current.aggregator;

    if args.list_rounds {
        let js = json!({
            "season": aggregator.season(),
            "vote_rounds": aggregator.vote_rounds(),
            "extra_columns": aggregator.extra_columns(),
        });
        let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
        return write_output(&args.out, &pretty);
    }

    if args.list_contestants {
        let infos = aggregator.contestants();
        info!("run_tally: {} contestants", infos.len());
        let js = build_contestants_js(aggregator.season(), &infos);
        let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
        return write_output(&args.out, &pretty);
    }

    let res = aggregator.votes_by_rounds(&args.exclude, args.exclude_wildcard, args.exclude_ranking);
    info!(
        "run_tally: {} contestants over {} rounds",
        res.votes.len(),
        res.rounds.len()
    );

    let result_js = build_payload_js(aggregator.season(), &res);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(&args.out, &pretty_js)?;

    if let Some(reference_p) = &args.reference {
        let reference = read_reference(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference results");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            return ReferenceMismatchSnafu { path: reference_p }.fail();
        }
    }

    Ok(())
}
