use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use voting_rules::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;
use crate::election::io_common::{simplify_file_name, ValueGrid};

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ElectionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The excel file does not contain any worksheet"))]
    EmptyExcel {},
    #[snafu(display("Cannot find worksheet {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display("Line {lineno}: cell {content} is not a number"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a line of a CSV file"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno}: cell {content:?} is not a number"))]
    CsvWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number or a column name"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ElectionResult<T> = Result<T, ElectionError>;

fn round_stats_to_json(rs: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (alt, count) in round_stat.tally.iter() {
            tally.insert(alt.to_string(), json!(count.to_string()));
        }
        let eliminated: Vec<u32> = round_stat.eliminated.iter().map(|alt| alt.0).collect();
        l.push(json!({
            "round": round_stat.round,
            "tally": tally,
            "eliminated": eliminated
        }));
    }
    l
}

fn build_summary_js(
    config: &ElectionConfig,
    rule: &VotingRule,
    tie: &TieBreak,
    rv: &VotingResult,
) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        rule: rule.name().to_string(),
        tiebreak: tie.to_string(),
    };
    let mut tally: JSMap<String, JSValue> = JSMap::new();
    for (alt, score) in rv.tally.iter() {
        tally.insert(alt.to_string(), json!(score));
    }
    let tied: Vec<u32> = rv.tied.iter().map(|alt| alt.0).collect();
    let mut results = json!({
        "winner": rv.winner.0,
        "tied": tied,
        "tally": tally
    });
    if !rv.round_stats.is_empty() {
        results["rounds"] = JSValue::Array(round_stats_to_json(rv));
    }
    json!({
        "config": c,
        "results": results
    })
}

fn read_valuation_data(root_path: &Path, cfs: &FileSource) -> ElectionResult<ValueGrid> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read valuation file {:?}", p2);
    let grid = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_values(p2, cfs)?,
        "xlsx" | "excel" => io_excel::read_excel_values(p2, cfs)?,
        x => whatever!("Provider not implemented {:?}", x),
    };
    debug!(
        "read_valuation_data: {} rows from {}",
        grid.rows.len(),
        cfs.file_path
    );
    Ok(grid)
}

/// Builds a configuration from the command line flags when no configuration file is given.
pub fn config_from_args(args: &Args) -> ElectionResult<ElectionConfig> {
    let input = match args.input.clone() {
        Some(x) => x,
        None => whatever!("An input file (--input) or a configuration file (--config) is required"),
    };
    let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
    let source = FileSource::new(&provider, &input, args.excel_worksheet_name.clone());
    let rules = ElectionRules {
        voting_rule: args.rule.clone().unwrap_or_else(|| "plurality".to_string()),
        tiebreak_mode: args.tie_break.clone().map(JSValue::String),
        dictator: args.agent.map(|a| json!(a)),
        score_vector: args.scores.clone(),
    };
    Ok(ElectionConfig {
        output_settings: OutputSettings {
            contest_name: simplify_file_name(&input),
            contest_date: None,
        },
        valuation_sources: vec![source],
        rules,
    })
}

/// Runs an election described by a configuration file.
pub fn run_election(
    config_path: String,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> ElectionResult<JSValue> {
    let config_p = Path::new(config_path.as_str());
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path.clone(),
    })?;
    let config: ElectionConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    run_election_config(&config, root_p, check_summary_path, out_path)
}

/// Runs an election. The paths of the sources are relative to `root_path`.
pub fn run_election_config(
    config: &ElectionConfig,
    root_path: &Path,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> ElectionResult<JSValue> {
    // Validate the rules before reading any data.
    let rule = config.rules.voting_rule()?;
    let tie = config.rules.tie_break()?;

    if config.valuation_sources.is_empty() {
        whatever!("No valuation source in the configuration");
    }

    let mut data = ValueGrid::default();
    for cfs in config.valuation_sources.iter() {
        data.append(read_valuation_data(root_path, cfs)?);
    }
    let table = ValuationTable::from_source(&data).context(VotingSnafu {})?;
    info!(
        "Read {} agents and {} alternatives",
        table.num_agents(),
        table.num_alternatives()
    );

    let result = run_voting_stats(&table, &rule, &tie).context(VotingSnafu {})?;
    info!("result: {:?}", result);

    let result_js = build_summary_js(config, &rule, &tie, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out_path.as_deref() {
        Some("stdout") | None => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path })?;
            info!("Summary written to {}", path);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(result_js)
}

/// Entry point for the command line.
pub fn run_election_cli(args: &Args) -> ElectionResult<JSValue> {
    if let Some(config_path) = args.config.clone() {
        run_election(config_path, args.reference.clone(), args.out.clone())
    } else {
        let config = config_from_args(args)?;
        run_election_config(
            &config,
            Path::new(""),
            args.reference.clone(),
            args.out.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"))
    }

    fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> JSValue {
        let _ = env_logger::builder().is_test(true).try_init();
        info!("Running test {}", test_name);
        let res = run_election(
            format!("{}/{}/{}", test_dir(), test_name, config_lpath),
            Some(format!("{}/{}/{}", test_dir(), test_name, summary_lpath)),
            None,
        );
        match res {
            Ok(js) => js,
            Err(e) => panic!("test {} failed: {}", test_name, e),
        }
    }

    fn test_wrapper(test_name: &str) -> JSValue {
        run_election_test(
            test_name,
            format!("{}_config.json", test_name).as_str(),
            format!("{}_expected_summary.json", test_name).as_str(),
        )
    }

    #[test]
    fn plurality_tie_max() {
        test_wrapper("plurality_tie_max");
    }

    #[test]
    fn borda_tie_agent() {
        test_wrapper("borda_tie_agent");
    }

    #[test]
    fn stv_rounds() {
        let js = test_wrapper("stv_rounds");
        assert_eq!(js["results"]["rounds"].as_array().map(|a| a.len()), Some(3));
    }

    #[test]
    fn scoring_vector_header() {
        test_wrapper("scoring_vector_header");
    }

    #[test]
    fn range_voting_excel() {
        test_wrapper("range_voting_excel");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let name = "plurality_tie_max";
        let res = run_election(
            format!("{}/{}/{}_config.json", test_dir(), name, name),
            Some(format!(
                "{}/borda_tie_agent/borda_tie_agent_expected_summary.json",
                test_dir()
            )),
            None,
        );
        assert!(matches!(res, Err(ElectionError::Whatever { .. })));
    }

    fn args_for(input: &str, rule: &str) -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: Some(input.to_string()),
            input_type: None,
            excel_worksheet_name: None,
            rule: Some(rule.to_string()),
            tie_break: Some("min".to_string()),
            agent: None,
            scores: None,
            verbose: false,
        }
    }

    #[test]
    fn cli_dictatorship() {
        let mut args = args_for(
            &format!("{}/plurality_tie_max/values.csv", test_dir()),
            "dictatorship",
        );
        args.agent = Some(2);
        let js = run_election_cli(&args).unwrap();
        assert_eq!(js["results"]["winner"], json!(2));
        assert_eq!(js["config"]["contest"], json!("values.csv"));

        args.agent = Some(3);
        let res = run_election_cli(&args);
        assert!(matches!(
            res,
            Err(ElectionError::Voting {
                source: VotingErrors::UnknownAgent { .. }
            })
        ));
    }

    #[test]
    fn cli_harmonic_with_output_file() {
        let mut args = args_for(
            &format!("{}/stv_rounds/values.csv", test_dir()),
            "harmonic",
        );
        let out = std::env::temp_dir().join("vrules_cli_harmonic_summary.json");
        args.out = Some(out.display().to_string());
        let js = run_election_cli(&args).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        let written_js: JSValue = serde_json::from_str(&written).unwrap();
        assert_eq!(written_js, js);
        assert_eq!(js["results"]["tally"]["1"], json!("14/3"));
        assert_eq!(js["results"]["tally"]["2"], json!("29/6"));
        assert_eq!(js["results"]["winner"], json!(2));
    }

    #[test]
    fn cli_requires_an_input() {
        let mut args = args_for("unused.csv", "borda");
        args.input = None;
        assert!(run_election_cli(&args).is_err());
    }

    #[test]
    fn cli_scoring_needs_a_vector() {
        let mut args = args_for(
            &format!("{}/plurality_tie_max/values.csv", test_dir()),
            "scoring",
        );
        assert!(run_election_cli(&args).is_err());
        args.scores = Some(vec![0.0, 1.0, 1.0]);
        let js = run_election_cli(&args).unwrap();
        // Agents rank 3 last, 1 and 2 get 2 points each.
        assert_eq!(js["results"]["tied"], json!([1, 2]));
        assert_eq!(js["results"]["winner"], json!(1));
    }
}
