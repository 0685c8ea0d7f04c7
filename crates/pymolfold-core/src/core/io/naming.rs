/// Turns a record's `source` field into a file name.
///
/// Keeps alphanumerics and `._- `, replaces anything else with `_`, strips
/// dots and spaces from both ends and joins the remaining words with `_`.
pub fn clean_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    let joined = trimmed.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "structure".to_string()
    } else {
        joined
    }
}

/// Looser cleaning for user-supplied names: only path separators and NUL are replaced.
pub fn safe_filename(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "model".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_filename_replaces_disallowed_characters() {
        assert_eq!(clean_filename("boltz2:model/1.cif"), "boltz2_model_1.cif");
    }

    #[test]
    fn clean_filename_trims_dots_and_joins_words() {
        assert_eq!(clean_filename("  ..my   model.pdb. "), "my_model.pdb");
    }

    #[test]
    fn clean_filename_falls_back_when_nothing_remains() {
        assert_eq!(clean_filename(" . . "), "structure");
        assert_eq!(clean_filename(""), "structure");
    }

    #[test]
    fn safe_filename_replaces_separators_and_whitespace() {
        assert_eq!(safe_filename(" a/b\\c d\te "), "a_b_c_d_e");
        assert_eq!(safe_filename("x\0y"), "x_y");
    }

    #[test]
    fn safe_filename_keeps_other_punctuation() {
        assert_eq!(safe_filename("ptm:1(a)"), "ptm:1(a)");
        assert_eq!(safe_filename("   "), "model");
    }
}
