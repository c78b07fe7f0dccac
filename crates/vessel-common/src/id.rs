//! Container identity generation.

/// Number of digits in a generated container identity.
pub const ID_LENGTH: usize = 10;

/// Generate a random container identity.
///
/// The identity is a 10-digit decimal string. It is not guaranteed to be
/// globally unique; the collision probability over a single host's
/// container population is accepted.
#[must_use]
pub fn random_id() -> String {
    random_digits(ID_LENGTH)
}

/// Generate `n` random decimal digits.
///
/// Also used to default a container name when the operator does not
/// choose one.
#[must_use]
pub fn random_digits(n: usize) -> String {
    (0..n).map(|_| fastrand::digit(10)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_ten_digits() {
        let id = random_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn ids_differ() {
        // Not a uniqueness guarantee, but two draws colliding would be a
        // one-in-ten-billion event worth noticing.
        assert_ne!(random_id(), random_id());
    }
}
