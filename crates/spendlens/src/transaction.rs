//! Transactional scripts.
//!
//! The warehouse runs a multi-statement script atomically when it is wrapped in
//! `BEGIN TRANSACTION` / `COMMIT TRANSACTION`. The wrapper is purely textual:
//! statements are embedded verbatim, one per line, and must already be complete
//! and `;`-terminated.

/// Wrap already-built statements in a transactional script.
///
/// ```
/// use spendlens::build_transactional_query;
///
/// assert_eq!(
///     build_transactional_query(&["X;", "Y;"]),
///     "\nBEGIN\nBEGIN TRANSACTION;\n\nX;\nY;\n\nCOMMIT TRANSACTION;\nEND;"
/// );
/// ```
pub fn build_transactional_query<S: AsRef<str>>(queries: &[S]) -> String {
    let body_len: usize = queries.iter().map(|q| q.as_ref().len() + 1).sum();
    let mut script = String::with_capacity(body_len + 64);

    script.push_str("\nBEGIN\nBEGIN TRANSACTION;\n\n");
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            script.push('\n');
        }
        script.push_str(query.as_ref());
    }
    script.push_str("\n\nCOMMIT TRANSACTION;\nEND;");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_two_statements() {
        let script = build_transactional_query(&["X;", "Y;"]);
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines,
            vec![
                "",
                "BEGIN",
                "BEGIN TRANSACTION;",
                "",
                "X;",
                "Y;",
                "",
                "COMMIT TRANSACTION;",
                "END;"
            ]
        );
    }

    #[test]
    fn accepts_owned_strings() {
        let stmts = vec!["DELETE FROM `a.b`;".to_string()];
        assert!(build_transactional_query(&stmts).contains("\nDELETE FROM `a.b`;\n"));
    }

    #[test]
    fn empty_script_keeps_template() {
        let empty: [&str; 0] = [];
        assert_eq!(
            build_transactional_query(&empty),
            "\nBEGIN\nBEGIN TRANSACTION;\n\n\n\nCOMMIT TRANSACTION;\nEND;"
        );
    }
}
