//! CLI argument parsing

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crate::report::{ReportOptions, SortKey};

#[derive(Parser)]
#[command(name = "sat-report")]
#[command(author, version, about = "Filter, sort and tabulate records from JSON or YAML", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Render a JSON or YAML document as a report
    Render(RenderArgs),

    /// Parse a filter query and show how it was understood
    Explain {
        /// The filter query
        query: String,

        /// Field names to resolve the query's keys against
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Show which field a key abbreviation resolves to
    Resolve {
        /// Key or abbreviation; quote it to require an exact match
        key: String,

        /// Candidate field names, in priority order
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

#[derive(clap::Args)]
pub struct RenderArgs {
    /// Path to the input document, or '-' for stdin
    pub input: String,

    /// Filter query; repeat to combine with AND
    #[arg(long = "filter", value_name = "QUERY")]
    pub filters: Vec<String>,

    /// Column name, abbreviation or zero-based index to sort by
    #[arg(long, value_name = "NAME|INDEX")]
    pub sort_by: Option<SortKey>,

    /// Reverse the sort order
    #[arg(long)]
    pub reverse: bool,

    /// Columns to display
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Columns never pruned for being empty or missing
    #[arg(long, value_delimiter = ',')]
    pub force_columns: Vec<String>,

    /// Headings for documents whose rows are lists
    #[arg(long, value_delimiter = ',')]
    pub headings: Option<Vec<String>>,

    /// Title printed above the report
    #[arg(long)]
    pub title: Option<String>,

    /// Output format
    #[arg(long, value_enum, env = "SAT_REPORT_FORMAT", default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Omit the title and header row
    #[arg(long, env = "SAT_REPORT_NO_HEADINGS", value_parser = BoolishValueParser::new())]
    pub no_headings: bool,

    /// Omit table borders
    #[arg(long, env = "SAT_REPORT_NO_BORDERS", value_parser = BoolishValueParser::new())]
    pub no_borders: bool,

    /// Keep columns that are EMPTY in every row
    #[arg(long, env = "SAT_REPORT_SHOW_EMPTY", value_parser = BoolishValueParser::new())]
    pub show_empty: bool,

    /// Keep columns that are MISSING in every row
    #[arg(long, env = "SAT_REPORT_SHOW_MISSING", value_parser = BoolishValueParser::new())]
    pub show_missing: bool,
}

impl RenderArgs {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: self.title.clone(),
            sort_by: self.sort_by.clone(),
            reverse: self.reverse,
            no_headings: self.no_headings,
            no_borders: self.no_borders,
            show_empty: self.show_empty,
            show_missing: self.show_missing,
            force_columns: self.force_columns.clone(),
            filter_strings: self.filters.clone(),
            filter_predicates: Vec::new(),
            display_headings: self.fields.clone(),
            print_format: self.format,
        }
    }
}
