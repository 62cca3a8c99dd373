const FIELD_SEPARATOR: &str = "|";
const WHITESPACE_DELIMITER: &str = "-";

/// Durable identity for a finding. Pure function of the three semantic
/// fields: no salts, no timestamps, stable across restarts.
pub fn fingerprint(kind: &str, message: &str, source: &str) -> String {
    [kind, message, source]
        .map(normalize)
        .join(FIELD_SEPARATOR)
}

fn normalize(field: &str) -> String {
    field
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(WHITESPACE_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_triples_yield_identical_fingerprints() {
        let a = fingerprint("Security Vulnerability", "MFA is not implemented", "Security Scanner");
        let b = fingerprint("Security Vulnerability", "MFA is not implemented", "Security Scanner");
        assert_eq!(a, b);
    }

    #[test]
    fn case_and_whitespace_runs_do_not_change_identity() {
        let a = fingerprint("Security Vulnerability", "MFA is not implemented", "Security Scanner");
        let b = fingerprint(
            "  security   VULNERABILITY ",
            "mfa\tis not\n implemented",
            "SECURITY scanner",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_fields_yield_distinct_fingerprints() {
        let base = fingerprint("Security Vulnerability", "MFA is not implemented", "Security Scanner");
        assert_ne!(
            base,
            fingerprint("Security Vulnerability", "SSO is not implemented", "Security Scanner")
        );
        assert_ne!(
            base,
            fingerprint("Compliance Gap", "MFA is not implemented", "Security Scanner")
        );
        assert_ne!(
            base,
            fingerprint("Security Vulnerability", "MFA is not implemented", "Audit Bot")
        );
    }

    #[test]
    fn field_boundaries_survive_normalization() {
        // "a b" + "c" must not collide with "a" + "b c".
        assert_ne!(fingerprint("a b", "c", "s"), fingerprint("a", "b c", "s"));
    }
}
