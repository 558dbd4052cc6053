//! New-file detection: remote names minus local names.

use std::collections::BTreeSet;

use reporter_core::Filename;

/// Names present in `remote` but absent from `local`.
///
/// Comparison is exact string equality. The result is sorted and free of
/// duplicates, so "the first new file" is always the lexicographically
/// smallest one.
pub fn new_files(remote: &[Filename], local: &[Filename]) -> Vec<Filename> {
    let local: BTreeSet<&Filename> = local.iter().collect();
    remote
        .iter()
        .filter(|name| !local.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
