//! Comparison of dataset groups against the group CSV

use serde::Serialize;
use std::collections::BTreeSet;

/// Group names found in one source, the other, or both (each sorted)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupComparison {
    pub only_in_dataset: Vec<String>,
    pub only_in_csv: Vec<String>,
    pub in_both: Vec<String>,
    pub dataset_total: usize,
    pub csv_total: usize,
}

impl GroupComparison {
    /// Percentage of CSV groups present in the dataset
    pub fn coverage(&self) -> f64 {
        if self.csv_total == 0 {
            return 0.0;
        }
        self.in_both.len() as f64 / self.csv_total as f64 * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Group comparison:\n\
            - Groups in dataset: {}\n\
            - Groups in CSV: {}\n\
            - Only in dataset: {}\n\
            - Only in CSV: {}\n\
            - In both: {}\n\
            - Coverage: {:.2}% of CSV groups are in the dataset",
            self.dataset_total,
            self.csv_total,
            list_or_none(&self.only_in_dataset),
            list_or_none(&self.only_in_csv),
            self.in_both.len(),
            self.coverage()
        )
    }
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

fn to_strings<'a, I: Iterator<Item = &'a &'a str>>(names: I) -> Vec<String> {
    names.map(|name| name.to_string()).collect()
}

/// Exact (case-sensitive) comparison of two group name collections
pub fn compare_groups<'a, D, C>(dataset_keys: D, csv_groups: C) -> GroupComparison
where
    D: IntoIterator<Item = &'a str>,
    C: IntoIterator<Item = &'a str>,
{
    let dataset: BTreeSet<&str> = dataset_keys.into_iter().collect();
    let csv: BTreeSet<&str> = csv_groups.into_iter().collect();

    GroupComparison {
        only_in_dataset: to_strings(dataset.difference(&csv)),
        only_in_csv: to_strings(csv.difference(&dataset)),
        in_both: to_strings(dataset.intersection(&csv)),
        dataset_total: dataset.len(),
        csv_total: csv.len(),
    }
}
