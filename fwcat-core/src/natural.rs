//! Natural alphanumeric ordering for device names and build identifiers
//!
//! Embedded digit runs compare by numeric value, everything else compares
//! character by character, ignoring ASCII case. `iPhone10,2` sorts before
//! `iPhone10,10` and `19A346` before `19A404`.

use std::cmp::Ordering;

/// Direction for [`sort_natural_by_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Compare two strings in natural order
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let run_a = digit_run(a, i);
                let run_b = digit_run(b, j);
                i += run_a.len();
                j += run_b.len();
                match cmp_digit_runs(run_a, run_b) {
                    Ordering::Equal => continue,
                    ordering => return ordering,
                }
            }
            (Some(ca), Some(cb)) => {
                match ca.to_ascii_lowercase().cmp(&cb.to_ascii_lowercase()) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    ordering => return ordering,
                }
            }
        }
    }
}

/// Sort `items` by the natural order of `key`, in the given direction
///
/// The sort is stable, so entries whose keys compare equal keep their
/// original relative order.
pub fn sort_natural_by_key<T, F>(items: &mut [T], order: SortOrder, key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| order.apply(natural_cmp(key(a), key(b))));
}

fn digit_run(bytes: &[u8], start: usize) -> &[u8] {
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    &bytes[start..start + len]
}

// Compares by value without parsing, so arbitrarily long runs never overflow.
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = strip_leading_zeros(a);
    let b = strip_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(run: &[u8]) -> &[u8] {
    let zeros = run.iter().take_while(|&&b| b == b'0').count();
    &run[zeros..]
}
