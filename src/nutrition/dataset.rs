//! Nutrition dataset loading
//!
//! Merges every CSV file in the data directory into one read-only table.
//! The process-wide copy is built on first use and never rebuilt.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use super::error::{NutritionError, NutritionResult};
use super::matcher::sort_tokens;
use super::record::{parse_numeric, FieldValue, Nutrients, NutritionRecord, FOOD_COLUMN};

static DATASET: OnceCell<Dataset> = OnceCell::new();

/// Get the process-wide dataset, loading it from `dir` on first call
///
/// Concurrent first callers block until a single load finishes. Once a load
/// has succeeded, later calls return the cached dataset and `dir` is ignored.
/// A failed load is not cached, so a later call retries.
pub fn load(dir: &Path) -> NutritionResult<&'static Dataset> {
    init_once(&DATASET, || Dataset::load_dir(dir))
}

fn init_once<F>(cell: &OnceCell<Dataset>, build: F) -> NutritionResult<&Dataset>
where
    F: FnOnce() -> NutritionResult<Dataset>,
{
    cell.get_or_try_init(build)
}

/// The process-wide dataset, if it has been loaded
pub fn loaded() -> Option<&'static Dataset> {
    DATASET.get()
}

/// In-memory nutrition table with its search corpus
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<NutritionRecord>,
    /// Lowercase food names, position-aligned with `records`
    corpus: Vec<String>,
    /// Token-sorted corpus names as chars, position-aligned with `records`
    keys: Vec<Vec<char>>,
    /// Union of non-schema columns across all source files, first-seen order
    extra_columns: Vec<String>,
    source_files: Vec<PathBuf>,
}

/// One parsed source file
struct Table {
    records: Vec<NutritionRecord>,
    extra_columns: Vec<String>,
}

impl Dataset {
    /// Load and merge every data file in `dir` (non-recursive)
    ///
    /// Any unreadable or malformed file fails the whole load.
    pub fn load_dir(dir: &Path) -> NutritionResult<Self> {
        let files = data_files(dir)?;

        let mut records = Vec::new();
        let mut extra_columns: Vec<String> = Vec::new();

        for path in &files {
            let table = read_table(path)?;
            tracing::debug!("Read {} rows from {}", table.records.len(), path.display());

            for column in table.extra_columns {
                if !extra_columns.contains(&column) {
                    extra_columns.push(column);
                }
            }
            records.extend(table.records);
        }

        tracing::info!(
            "Loaded nutrition dataset: {} rows from {} file(s) in {}",
            records.len(),
            files.len(),
            dir.display()
        );

        Ok(Self::from_parts(records, extra_columns, files))
    }

    /// Build a dataset from records already in memory
    ///
    /// Food names are lowercased; extra columns are collected from the records.
    pub fn from_records(records: Vec<NutritionRecord>) -> Self {
        let mut extra_columns: Vec<String> = Vec::new();
        for record in &records {
            for column in record.extra.keys() {
                if !extra_columns.contains(column) {
                    extra_columns.push(column.clone());
                }
            }
        }
        let records = records
            .into_iter()
            .map(|mut r| {
                r.food = r.food.trim().to_lowercase();
                r
            })
            .collect();

        Self::from_parts(records, extra_columns, Vec::new())
    }

    fn from_parts(
        records: Vec<NutritionRecord>,
        extra_columns: Vec<String>,
        source_files: Vec<PathBuf>,
    ) -> Self {
        let corpus: Vec<String> = records.iter().map(|r| r.food.clone()).collect();
        let keys = corpus
            .iter()
            .map(|name| sort_tokens(name).chars().collect())
            .collect();

        Self {
            records,
            corpus,
            keys,
            extra_columns,
            source_files,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NutritionRecord] {
        &self.records
    }

    /// Get the record at a corpus position
    pub fn record(&self, position: usize) -> Option<&NutritionRecord> {
        self.records.get(position)
    }

    /// The search corpus: lowercase food names in dataset order
    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    pub(crate) fn keys(&self) -> &[Vec<char>] {
        &self.keys
    }
}

/// List the data files in `dir`, sorted by path
fn data_files(dir: &Path) -> NutritionResult<Vec<PathBuf>> {
    let io_err = |source| NutritionError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_data_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(NutritionError::NoDataFiles(dir.to_path_buf()));
    }
    Ok(files)
}

fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Normalize a header cell: trim and lowercase; blank headers get a positional name
fn normalize_header(raw: &str, index: usize) -> String {
    let name = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    if name.is_empty() {
        format!("unnamed: {}", index)
    } else {
        name
    }
}

fn read_table(path: &Path) -> NutritionResult<Table> {
    let malformed = |source| NutritionError::Malformed {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(malformed)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .enumerate()
        .map(|(i, h)| normalize_header(h, i))
        .collect();

    let food_index = headers
        .iter()
        .position(|h| h == FOOD_COLUMN)
        .ok_or_else(|| NutritionError::MissingFoodColumn(path.to_path_buf()))?;

    let extra_columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != food_index && !Nutrients::COLUMNS.contains(&h.as_str()))
        .map(|(_, h)| h.clone())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(malformed)?;

        let mut record = NutritionRecord {
            food: row.get(food_index).unwrap_or("").trim().to_lowercase(),
            nutrients: Nutrients::default(),
            extra: Default::default(),
        };

        for (i, (header, cell)) in headers.iter().zip(row.iter()).enumerate() {
            if i == food_index {
                continue;
            }
            if !record.nutrients.set(header, parse_numeric(cell)) {
                record.extra.insert(header.clone(), FieldValue::parse(cell));
            }
        }

        records.push(record);
    }

    Ok(Table {
        records,
        extra_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_load_merges_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "food,Caloric Value\nBeef Steak,271\n");
        write(dir.path(), "a.csv", "food,Caloric Value\nChicken Breast,165\nApple,52\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.corpus(), &["chicken breast", "apple", "beef steak"]);
        assert_eq!(dataset.record(2).unwrap().nutrients.caloric_value, 271.0);
        assert_eq!(dataset.source_files().len(), 2);
    }

    #[test]
    fn test_headers_normalized() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "foods.csv",
            ",  FOOD ,Caloric Value , Vitamin B12,Fat\n0,Greek Yogurt,59,0.5,0.4\n",
        );

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        let record = dataset.record(0).unwrap();

        assert_eq!(record.food, "greek yogurt");
        assert_eq!(record.nutrients.caloric_value, 59.0);
        assert_eq!(record.nutrients.vitamin_b12, 0.5);
        assert_eq!(record.nutrients.fat, 0.4);
        assert_eq!(record.extra.get("unnamed: 0"), Some(&FieldValue::Number(0.0)));
        assert_eq!(dataset.extra_columns(), &["unnamed: 0"]);
    }

    #[test]
    fn test_keeps_duplicate_rows() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "d.csv", "food,protein\negg,6\nEGG,7\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();

        assert_eq!(dataset.corpus(), &["egg", "egg"]);
        assert_eq!(dataset.record(1).unwrap().nutrients.protein, 7.0);
    }

    #[test]
    fn test_non_numeric_cells() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "d.csv", "food,protein,sodium,group\nrice,n/a,,grain\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        let record = dataset.record(0).unwrap();

        assert_eq!(record.nutrients.protein, 0.0);
        assert_eq!(record.nutrients.sodium, 0.0);
        assert_eq!(record.extra.get("group"), Some(&FieldValue::Text("grain".to_string())));
    }

    #[test]
    fn test_quoted_food_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "d.csv", "food,fat\n\"Cheese, Cheddar\",33\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();

        assert_eq!(dataset.corpus(), &["cheese, cheddar"]);
        assert_eq!(dataset.record(0).unwrap().nutrients.fat, 33.0);
    }

    #[test]
    fn test_ignores_other_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "not a table");
        write(dir.path(), "nutrimind.db", "binary");
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "more.csv", "food\nhidden\n");
        write(dir.path(), "FOODS.CSV", "food\ntoast\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();

        assert_eq!(dataset.corpus(), &["toast"]);
    }

    #[test]
    fn test_missing_food_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "food,fat\nbutter,81\n");
        write(dir.path(), "b.csv", "name,fat\nlard,100\n");

        let err = Dataset::load_dir(dir.path()).unwrap_err();

        assert!(err.is_schema());
        assert!(matches!(err, NutritionError::MissingFoodColumn(p) if p.ends_with("b.csv")));
    }

    #[test]
    fn test_ragged_row_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "food,fat\nbutter,81\n");
        write(dir.path(), "b.csv", "food,fat\nlard,100,extra\n");

        let err = Dataset::load_dir(dir.path()).unwrap_err();

        assert!(err.is_data_load());
        assert!(matches!(err, NutritionError::Malformed { .. }));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, NutritionError::NoDataFiles(_)));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load_dir(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, NutritionError::Io { .. }));
        assert!(err.is_data_load());
    }

    #[test]
    fn test_extra_columns_union() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "food,group\nkale,vegetable\n");
        write(dir.path(), "b.csv", "food,source\ncod,sea\n");

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        let normalized = dataset.record(0).unwrap().normalize(dataset.extra_columns());

        assert_eq!(dataset.extra_columns(), &["group", "source"]);
        assert_eq!(normalized.extra.get("source"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_from_records_lowercases_names() {
        let dataset = Dataset::from_records(vec![NutritionRecord {
            food: " Oat Milk ".to_string(),
            nutrients: Nutrients::default(),
            extra: Default::default(),
        }]);

        assert_eq!(dataset.corpus(), &["oat milk"]);
        assert_eq!(dataset.keys()[0], "milk oat".chars().collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrent_first_load_builds_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Barrier;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "foods.csv", "food,Caloric Value\nApple,52\nBanana,105\n");

        let cell = OnceCell::new();
        let builds = AtomicUsize::new(0);
        let threads = 8;
        let barrier = Barrier::new(threads);

        let datasets: Vec<&Dataset> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        init_once(&cell, || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Dataset::load_dir(dir.path())
                        })
                        .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(datasets.iter().all(|d| std::ptr::eq(*d, datasets[0])));
        assert_eq!(datasets[0].len(), 2);
    }

    #[test]
    fn test_init_once_retries_after_failure() {
        let cell = OnceCell::new();
        assert!(init_once(&cell, || Err(NutritionError::NoDataFiles(PathBuf::from("/none")))).is_err());
        assert!(cell.get().is_none());

        let dataset = init_once(&cell, || Ok(Dataset::from_records(Vec::new()))).unwrap();
        assert!(dataset.is_empty());
    }

    // The only test touching the process-wide copy
    #[test]
    fn test_global_load_retries_failures_then_caches() {
        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(load(empty.path()), Err(NutritionError::NoDataFiles(_))));
        assert!(loaded().is_none());

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "foods.csv", "food,Caloric Value\nFried Rice,238\n");
        let first = load(dir.path()).unwrap();
        let again = load(Path::new("/nonexistent")).unwrap();

        assert!(std::ptr::eq(first, again));
        assert_eq!(loaded().map(Dataset::len), Some(1));

        let found = super::super::matcher::match_food(Path::new("/nonexistent"), "Rice Fried", None)
            .unwrap()
            .unwrap();
        assert_eq!(found.nutrition.food, "fried rice");
    }
}
