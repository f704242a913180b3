//! Folder orchestration policy tests
//!
//! These run against a mock warehouse so the skip/halt policies and the
//! outcome sequencing can be verified without a PostgreSQL instance.

use async_trait::async_trait;
use omop_load::load::{LoadOutcome, LoadStatus};
use omop_load::{process_folder, Warehouse};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

/// Records load calls and answers from fixed table sets.
struct MockWarehouse {
    existing: HashSet<String>,
    failing: HashSet<String>,
    loads: Vec<(String, u8)>,
}

impl MockWarehouse {
    fn with_tables(existing: &[&str]) -> Self {
        Self {
            existing: existing.iter().map(|t| t.to_string()).collect(),
            failing: HashSet::new(),
            loads: Vec::new(),
        }
    }

    fn failing_on(mut self, tables: &[&str]) -> Self {
        self.failing = tables.iter().map(|t| t.to_string()).collect();
        self
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn table_exists(&mut self, _schema: &str, table: &str) -> bool {
        self.existing.contains(table)
    }

    async fn load_file(
        &mut self,
        _schema: &str,
        table: &str,
        path: &Path,
        delimiter: u8,
    ) -> LoadOutcome {
        self.loads.push((table.to_string(), delimiter));
        if self.failing.contains(table) {
            LoadOutcome::failed(
                path.to_path_buf(),
                table,
                &anyhow::anyhow!("violates not-null constraint"),
            )
        } else {
            let size = std::fs::metadata(path).unwrap().len();
            LoadOutcome::loaded(path.to_path_buf(), table, size)
        }
    }
}

fn folder_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[tokio::test]
async fn missing_table_skips_and_continues() {
    let dir = folder_with(&[
        ("a.csv", "id\n1\n"),
        ("b.csv", "id\n2\n"),
        ("c.csv", "id\n3\n"),
    ]);
    let mut warehouse = MockWarehouse::with_tables(&["a", "c"]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    let statuses: Vec<LoadStatus> = outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        [
            LoadStatus::Loaded,
            LoadStatus::SkippedNoTable,
            LoadStatus::Loaded
        ]
    );
    assert_eq!(outcomes[0].table, "a");
    assert_eq!(outcomes[1].table, "b");
    assert_eq!(outcomes[2].table, "c");
    // The skipped file was never handed to the loader.
    assert_eq!(warehouse.loads.len(), 2);
}

#[tokio::test]
async fn hard_failure_halts_remaining_queue() {
    let dir = folder_with(&[
        ("a.csv", "id\n1\n"),
        ("b.csv", "id\n2\n"),
        ("c.csv", "id\n3\n"),
    ]);
    let mut warehouse = MockWarehouse::with_tables(&["a", "b", "c"]).failing_on(&["b"]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, LoadStatus::Loaded);
    assert_eq!(outcomes[1].status, LoadStatus::Failed);
    assert_eq!(outcomes[1].table, "b");
    assert!(outcomes[1].error.as_deref().unwrap().contains("not-null"));
    // c.csv was never attempted.
    assert_eq!(warehouse.loads.len(), 2);
}

#[tokio::test]
async fn loaded_outcome_reports_full_file_size() {
    let content = "person_id,year_of_birth\n1,1980\n2,1975\n";
    let dir = folder_with(&[("person.csv", content)]);
    let mut warehouse = MockWarehouse::with_tables(&["person"]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, LoadStatus::Loaded);
    assert_eq!(outcomes[0].bytes_transferred, content.len() as u64);
}

#[tokio::test]
async fn cpt4_file_routes_to_concept_and_is_repaired() {
    let dir = folder_with(&[(
        "concept_cpt4_subset.csv",
        "concept_id,concept_name,vocabulary_id\n1,,CPT4\n2,Office visit,CPT4\n",
    )]);
    let mut warehouse = MockWarehouse::with_tables(&["concept"]);

    let outcomes = process_folder(&mut warehouse, "vocab", dir.path(), b',').await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].table, "concept");
    assert_eq!(outcomes[0].status, LoadStatus::Loaded);

    // The repair ran before the load and mutated the file in place.
    let repaired = std::fs::read_to_string(dir.path().join("concept_cpt4_subset.csv")).unwrap();
    assert!(repaired.contains("Unknown CPT4 Concept"));
    assert!(!repaired.contains("1,,CPT4"));
}

#[tokio::test]
async fn non_cpt4_file_is_not_repaired() {
    let content = "condition_occurrence_id,person_id\n1,\n";
    let dir = folder_with(&[("condition_occurrence.csv", content)]);
    let mut warehouse = MockWarehouse::with_tables(&["condition_occurrence"]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert_eq!(outcomes[0].table, "condition_occurrence");
    // File untouched: empty fields outside the CPT4 case stay empty.
    let after = std::fs::read_to_string(dir.path().join("condition_occurrence.csv")).unwrap();
    assert_eq!(after, content);
}

#[tokio::test]
async fn delimiter_override_reaches_the_loader() {
    let dir = folder_with(&[("pipe_separated_table.csv", "a|b\n1|2\n")]);
    let mut warehouse = MockWarehouse::with_tables(&["pipe_separated_table"]);

    process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert_eq!(warehouse.loads, [("pipe_separated_table".to_string(), b'|')]);
}

#[tokio::test]
async fn empty_folder_yields_empty_sequence() {
    let dir = TempDir::new().unwrap();
    let mut warehouse = MockWarehouse::with_tables(&[]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert!(outcomes.is_empty());
    assert!(warehouse.loads.is_empty());
}

#[tokio::test]
async fn missing_folder_yields_empty_sequence() {
    let mut warehouse = MockWarehouse::with_tables(&["a"]);

    let outcomes =
        process_folder(&mut warehouse, "cdm", Path::new("/no/such/folder"), b',').await;

    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn non_csv_files_are_ignored() {
    let dir = folder_with(&[("a.csv", "id\n1\n"), ("readme.txt", "not data")]);
    let mut warehouse = MockWarehouse::with_tables(&["a"]);

    let outcomes = process_folder(&mut warehouse, "cdm", dir.path(), b',').await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].table, "a");
}
