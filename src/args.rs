use clap::Parser;

/// Converts a survey export into a PDF review document.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual of the survey_report crate
    /// for the list of options. Command line flags take precedence over the configuration.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export to convert.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or excel.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the only worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (directory or file path ending in .pdf) Where to write the document. When a directory is given,
    /// the file is named after the response of the first row.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) An image (PNG or JPEG) drawn at the top of every page.
    #[clap(long, value_parser)]
    pub logo: Option<String>,

    /// (pt or en, default pt) The language of the labels and of the placeholder for missing responses.
    #[clap(long, value_parser)]
    pub language: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the outline of the document will be written in JSON format
    /// to the given location.
    #[clap(long, value_parser)]
    pub outline: Option<String>,

    /// (file path) A reference outline in JSON format. If provided, surveypdf will check that the outline of the
    /// document matches the reference (the generation date is not compared).
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// The user name, when the configuration holds credentials.
    #[clap(short, long, value_parser)]
    pub user: Option<String>,

    /// The password, when the configuration holds credentials.
    #[clap(short, long, value_parser)]
    pub password: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
