use clap::Parser;

/// Computes the winner of an election from a table of valuations.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the election. When provided, the options describing
    /// the input and the rules are ignored.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, vrules will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The table of valuations: one row per agent, one column per alternative.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first worksheet is used otherwise.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default plurality) The voting rule: dictatorship, plurality, veto, borda, harmonic, scoring, stv or range.
    #[clap(long, value_parser)]
    pub rule: Option<String>,

    /// (default max) How to select a winner among tied alternatives: max, min or the number of an agent.
    #[clap(long, value_parser)]
    pub tie_break: Option<String>,

    /// The number of the dictator, for the dictatorship rule.
    #[clap(long, value_parser)]
    pub agent: Option<u32>,

    /// (list of comma-separated values) The score vector of the scoring rule, one value per alternative.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub scores: Option<Vec<f64>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
