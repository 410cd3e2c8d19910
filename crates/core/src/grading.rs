use crate::model::Pitch;

/// Grade a submitted answer against the expected one.
///
/// Correct iff both sequences have the same length and match elementwise.
/// Order-sensitive, no partial credit. Silence cannot appear on either side:
/// answers are `Pitch` sequences by construction.
#[must_use]
pub fn grade(submitted: &[Pitch], expected: &[Pitch]) -> bool {
    submitted.len() == expected.len()
        && submitted.iter().zip(expected.iter()).all(|(s, e)| s == e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_are_correct() {
        let xs = vec![Pitch::Do, Pitch::Mi, Pitch::So];
        assert!(grade(&xs, &xs));
        assert!(grade(&[Pitch::Si], &[Pitch::Si]));
    }

    #[test]
    fn length_mismatch_is_incorrect() {
        assert!(!grade(&[Pitch::Do], &[Pitch::Do, Pitch::Mi]));
        assert!(!grade(&[Pitch::Do, Pitch::Mi], &[Pitch::Do]));
        assert!(!grade(&[], &[Pitch::Do]));
    }

    #[test]
    fn same_multiset_in_wrong_order_is_incorrect() {
        let expected = [Pitch::Do, Pitch::Mi, Pitch::So];
        let reversed = [Pitch::So, Pitch::Mi, Pitch::Do];
        assert!(!grade(&reversed, &expected));
    }

    #[test]
    fn single_element_mismatch_is_incorrect() {
        let expected = [Pitch::Do, Pitch::Mi, Pitch::So];
        let off = [Pitch::Do, Pitch::Fa, Pitch::So];
        assert!(!grade(&off, &expected));
    }
}
