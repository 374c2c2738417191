//! CSV loading and saving

use crate::error::{Result, TabflowError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loads tabular data files into DataFrames
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with a header row
    pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path)?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| TabflowError::DataError(e.to_string()))
    }
}

/// Saves DataFrames to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| TabflowError::DataError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "4,5,6").unwrap();
        writeln!(file, "7,8,9").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::load_csv(file.path().to_str().unwrap()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_save_and_reload() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1, 2, 3]),
            Column::new("b".into(), &[4, 5, 6]),
        ])
        .unwrap();

        let file = NamedTempFile::new().unwrap();
        DataSaver::save_csv(&mut df, file.path().to_str().unwrap()).unwrap();

        let loaded = DataLoader::load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
    }
}
