//! Natural, case-insensitive string collation.
//!
//! Digit runs compare by numeric value (`"item2" < "item10"`), letters compare case-folded, and
//! strings that only differ by case order lowercase first. The remaining ties fall back to the
//! raw byte order so the result is a total order.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_runs(a, b, fold)
        .then_with(|| compare_runs(a, b, case_rank))
        .then_with(|| a.cmp(b))
}

fn fold(c: char) -> (u8, char) {
    (0, c.to_lowercase().next().unwrap_or(c))
}

fn case_rank(c: char) -> (u8, char) {
    let folded = c.to_lowercase().next().unwrap_or(c);
    (u8::from(c.is_uppercase()), folded)
}

fn compare_runs(a: &str, b: &str, key: fn(char) -> (u8, char)) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let da = take_digits(&mut ai);
                let db = take_digits(&mut bi);
                let ord = compare_digit_runs(&da, &db);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = key(ca).cmp(&key(cb));
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        out.push(c);
        it.next();
    }
    out
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("item10", "item2"), Ordering::Greater);
        assert_eq!(natural_cmp("25", "30"), Ordering::Less);
        assert_eq!(natural_cmp("100", "30"), Ordering::Greater);
    }

    #[test]
    fn letters_compare_without_case() {
        assert_eq!(natural_cmp("amy", "Bob"), Ordering::Less);
        assert_eq!(natural_cmp("Amy", "bob"), Ordering::Less);
        assert_eq!(natural_cmp("a", "A"), Ordering::Less);
    }

    #[test]
    fn leading_zeros_only_break_ties() {
        assert_ne!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("007", "8"), Ordering::Less);
    }

    #[test]
    fn shorter_prefix_sorts_first() {
        assert_eq!(natural_cmp("abc", "abcd"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }
}
