use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for starting the dashboard.
#[derive(Debug, Parser)]
#[command(author, version, about = "Bike-sharing usage dashboard", long_about = None)]
pub struct Cli {
    /// Usage dataset to load (.csv, .json or .parquet).
    #[arg(value_name = "FILE", default_value = "new_hour.csv")]
    pub path: PathBuf,
    /// Year selected at startup (defaults to the first year in the data).
    #[arg(long)]
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["bike-dash"]);
        assert_eq!(cli.path, PathBuf::from("new_hour.csv"));
        assert_eq!(cli.year, None);
    }

    #[test]
    fn path_and_year() {
        let cli = Cli::parse_from(["bike-dash", "data/hour.parquet", "--year", "2012"]);
        assert_eq!(cli.path, PathBuf::from("data/hour.parquet"));
        assert_eq!(cli.year, Some(2012));
    }
}
