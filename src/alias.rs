//! Choice mapping passes.
//!
//! Students type class titles free-hand, so two passes sit between record
//! construction and the cost model. The alias pass rewrites known variant
//! spellings via a configured mapping table; the catalog pass then drops
//! anything that still isn't a catalog member. Both passes produce new
//! records and preserve choice order.

use crate::catalog::{canonical_title, ClassCatalog};
use crate::students::Student;
use std::collections::BTreeMap;

/// Rewrites each student's choices through the alias table.
///
/// For every choice, an exact raw-text match is tried first, then a match on
/// the canonicalized form; when found, the canonicalized replacement is
/// substituted, otherwise the canonicalized original is kept. Empty results
/// and duplicates are dropped (first occurrence wins). Idempotent when the
/// alias table maps onto canonical titles.
pub fn apply_aliases(students: &[Student], aliases: &BTreeMap<String, String>) -> Vec<Student> {
    if aliases.is_empty() {
        return students.to_vec();
    }
    students
        .iter()
        .map(|student| {
            let mut mapped = Vec::with_capacity(student.choices.len());
            for choice in &student.choices {
                let canonical = canonical_title(choice);
                let replacement = aliases
                    .get(choice)
                    .or_else(|| aliases.get(&canonical))
                    .map(|r| canonical_title(r))
                    .unwrap_or(canonical);
                if !replacement.is_empty() && !mapped.contains(&replacement) {
                    mapped.push(replacement);
                }
            }
            student.with_choices(mapped)
        })
        .collect()
}

/// Drops every choice that is not a catalog member, preserving the order of
/// survivors.
///
/// Runs unconditionally after [`apply_aliases`]; afterwards every surviving
/// choice in every record is guaranteed to be a catalog title.
pub fn restrict_to_catalog(students: &[Student], catalog: &ClassCatalog) -> Vec<Student> {
    students
        .iter()
        .map(|student| {
            let mut kept: Vec<String> = Vec::with_capacity(student.choices.len());
            for choice in &student.choices {
                let canonical = canonical_title(choice);
                if catalog.contains(&canonical) && !kept.contains(&canonical) {
                    kept.push(canonical);
                }
            }
            student.with_choices(kept)
        })
        .collect()
}
