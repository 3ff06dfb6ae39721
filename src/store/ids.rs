use tracing::warn;

/// Next identifier for a table: one past the largest numeric id, starting at
/// `"1"`. Ids that do not parse as integers are skipped.
pub fn next_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = ids
        .into_iter()
        .filter_map(|id| match id.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(id, "ignoring non-numeric id while generating the next id");
                None
            }
        })
        .fold(0, i64::max);
    (max + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_starts_at_one() {
        assert_eq!(next_id([]), "1");
    }

    #[test]
    fn uses_numeric_max_not_lexicographic() {
        assert_eq!(next_id(["2", "10", "9"]), "11");
    }

    #[test]
    fn non_numeric_and_negative_ids_do_not_lower_the_result() {
        assert_eq!(next_id(["abc", "-5", ""]), "1");
        assert_eq!(next_id(["x1", " 4 "]), "5");
    }

    #[test]
    fn repeated_generation_never_repeats() {
        let mut ids: Vec<String> = vec!["3".into(), "junk".into()];
        for _ in 0..20 {
            let id = next_id(ids.iter().map(String::as_str));
            assert!(!ids.contains(&id));
            ids.push(id);
        }
    }
}
