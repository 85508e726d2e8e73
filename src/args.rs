use clap::{Parser, Subcommand};

/// Ingests the exports of the nurse feedback survey and summarizes them.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. Relative paths inside it are resolved
    /// against the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory) Where the collections are stored. Setting this option overrides the
    /// storeDirectory of the configuration.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Adds the records of one or more survey exports (csv or xlsx) to the collections.
    Upload {
        #[clap(value_parser, required = true)]
        files: Vec<String>,
        /// Deletes the existing records first.
        #[clap(long, takes_value = false)]
        replace: bool,
    },
    /// Replaces the collections with the default dataset.
    LoadDefaults,
    /// Deletes all the records.
    Clear,
    /// Prints the number of records in each collection.
    Stats,
    /// Computes the charts of the dashboard, in JSON format.
    Summary {
        /// (file path, 'stdout' or empty) Where to write the summary. Setting this option
        /// overrides the outputPath of the configuration.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference summary in JSON format. If provided, nfdash will check that
        /// the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Shows the records of one collection as a table.
    Table {
        /// technical, clinic or growth
        #[clap(value_parser)]
        collection: String,
        /// Only keeps the rows where one of the columns contains this text.
        #[clap(long, value_parser)]
        search: Option<String>,
        /// The id of the column to sort on (name, tabletWorking, ...).
        #[clap(long, value_parser)]
        sort: Option<String>,
        #[clap(long, takes_value = false)]
        desc: bool,
        /// (starts at 1)
        #[clap(long, value_parser)]
        page: Option<usize>,
        /// (10, 20, 30, 40 or 50 usually)
        #[clap(long, value_parser)]
        page_size: Option<usize>,
        /// (file path) Writes the rows matching the search to a CSV file.
        #[clap(long, value_parser)]
        export: Option<String>,
    },
}
