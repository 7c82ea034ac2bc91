//! Roster file parsing for bulk user import
//!
//! A roster is a CSV file with an `email,username,password` header. Parsing
//! is separated from the import itself so the format checks stay pure; the
//! duplicate-email skip happens later, against the store.

use serde::Deserialize;

/// One account row from a roster file
#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Parse a roster file into rows, preserving file order
pub fn parse_roster(bytes: &[u8]) -> Result<Vec<RosterRow>, String> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();

    for (index, record) in reader.deserialize::<RosterRow>().enumerate() {
        let row = record.map_err(|e| format!("Roster row {}: {}", index + 1, e))?;

        if row.email.trim().is_empty()
            || row.username.trim().is_empty()
            || row.password.is_empty()
        {
            return Err(format!(
                "Roster row {}: email, username, and password are all required",
                index + 1
            ));
        }

        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_file_order() {
        let data = b"email,username,password\n\
                     a@example.com,alice,secret-a\n\
                     b@example.com,bob,secret-b\n";

        let rows = parse_roster(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email, "a@example.com");
        assert_eq!(rows[0].username, "alice");
        assert_eq!(rows[1].email, "b@example.com");
    }

    #[test]
    fn header_order_does_not_matter() {
        let data = b"username,password,email\nalice,secret,a@example.com\n";

        let rows = parse_roster(data).unwrap();
        assert_eq!(rows[0].email, "a@example.com");
        assert_eq!(rows[0].password, "secret");
    }

    #[test]
    fn missing_column_is_rejected() {
        let data = b"email,username\na@example.com,alice\n";
        assert!(parse_roster(data).is_err());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let data = b"email,username,password\n,alice,secret\n";
        let err = parse_roster(data).unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn empty_file_yields_no_rows() {
        let rows = parse_roster(b"email,username,password\n").unwrap();
        assert!(rows.is_empty());
    }
}
