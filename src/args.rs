use clap::Parser;

/// This is a per-round vote tabulation program for elimination tournaments.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The table of votes, one row per contestant and one column per round.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (string, optional) The display name of the table. The season is detected from this name
    /// (for example `votes_2023_season.csv`). Defaults to the file name of the input.
    #[clap(short, long, value_parser)]
    pub name: Option<String>,

    /// (file path, optional) A JSON file with the schedules of the seasons. If not provided,
    /// the built-in schedules are used.
    #[clap(short, long, value_parser)]
    pub schedule: Option<String>,

    /// (round name, repeatable) A round to leave out of the results.
    #[clap(short, long, value_parser)]
    pub exclude: Vec<String>,

    /// If passed as an argument, the wildcard rounds are left out of the results.
    #[clap(long, takes_value = false)]
    pub exclude_wildcard: bool,

    /// If passed as an argument, the votes of a contestant are dropped after their elimination.
    #[clap(long, takes_value = false)]
    pub exclude_ranking: bool,

    /// (csv or xlsx) The type of the input. Inferred from the extension of the input by default.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the results in JSON format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected results in JSON format. If provided,
    /// roundtally will check that the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, only prints the rounds of the season.
    #[clap(long, takes_value = false)]
    pub list_rounds: bool,

    /// If passed as an argument, only prints the contestants of the table, with their series
    /// and avatar.
    #[clap(long, takes_value = false)]
    pub list_contestants: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
