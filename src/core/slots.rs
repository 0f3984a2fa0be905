use crate::models::{CandidateRecord, Field};

/// A slot counts as filled once it has any non-whitespace content
#[inline]
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Missing slots, always in canonical order
pub fn missing_fields(record: &CandidateRecord) -> Vec<Field> {
    Field::ALL
        .iter()
        .copied()
        .filter(|field| !is_present(record.get(*field)))
        .collect()
}

#[inline]
pub fn is_complete(record: &CandidateRecord) -> bool {
    Field::ALL.iter().all(|field| is_present(record.get(*field)))
}

/// Field-wise last-write-wins merge
///
/// A present value in `update` replaces the stored one; a blank value never
/// erases what is already known.
pub fn merge(stored: &mut CandidateRecord, update: &CandidateRecord) {
    for field in Field::ALL {
        let value = update.get(field);
        if is_present(value) {
            *stored.get_mut(field) = value.to_string();
        }
    }
}
