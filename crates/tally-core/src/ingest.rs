//! Statement CSV ingestion
//!
//! Parses Barclays-style statement exports:
//! `Number,Date,Account,Amount,Subcategory,Memo` with DD/MM/YYYY dates and
//! signed amounts. Rows the bank left blank or that fail to parse are skipped
//! with a warning rather than failing the batch.

use std::io::Read;
use std::sync::OnceLock;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::NewRawTransaction;

/// Strip the ` ON 12 JAN ...` suffix banks append to card memos
fn on_date_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+ON\s+\d{2}\s+\w{3}.*$").expect("valid regex"))
}

/// Strip ` AMOUNT IN ...` foreign-currency tails
fn amount_in_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+AMOUNT IN.*$").expect("valid regex"))
}

/// Strip trailing 3-letter currency codes
fn currency_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[A-Z]{3}$").expect("valid regex"))
}

/// Extract a merchant or source name from a statement memo.
///
/// Memos carry the counterparty name followed by bank noise (charge dates,
/// currency conversion details). Returns an empty string for an empty memo.
pub fn clean_merchant(memo: &str) -> String {
    if memo.is_empty() {
        return String::new();
    }

    let cleaned = on_date_suffix().replace(memo, "");
    let cleaned = amount_in_suffix().replace(&cleaned, "");
    let cleaned = currency_suffix().replace(&cleaned, "");

    cleaned.trim().to_string()
}

/// Generate a unique hash for deduplication across re-uploads.
///
/// Keyed on everything the bank export carries for a row, so two genuinely
/// distinct same-day, same-amount transactions only collide when the export
/// itself cannot tell them apart.
fn generate_hash(
    date: &NaiveDate,
    account: &str,
    amount: f64,
    subcategory: &str,
    memo: &str,
    number: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(account.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(subcategory.as_bytes());
    hasher.update(memo.as_bytes());
    if let Some(n) = number {
        hasher.update(n.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Parse a statement date (DD/MM/YYYY, with ISO accepted for hand-made files)
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%d/%m/%Y", // 15/01/2024 (Barclays export)
        "%Y-%m-%d", // 2024-01-15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Ingest(format!("Unable to parse date: {}", s)))
}

/// Parse a statement amount, tolerating currency symbols and separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().replace(['£', '$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Ingest(format!("Unable to parse amount: {}", s)))
}

/// Parse a statement CSV into raw transactions.
///
/// Amounts are stored as non-negative magnitudes; direction is recovered from
/// the subcategory at classification time.
pub fn parse_statement_csv<R: Read>(reader: R) -> Result<Vec<NewRawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

    let date_col = column("Date")
        .ok_or_else(|| Error::Ingest("Statement is missing a Date column".into()))?;
    let amount_col = column("Amount")
        .ok_or_else(|| Error::Ingest("Statement is missing an Amount column".into()))?;
    let number_col = column("Number");
    let account_col = column("Account");
    let subcategory_col = column("Subcategory");
    let memo_col = column("Memo");

    let field = |record: &csv::StringRecord, col: Option<usize>| -> String {
        col.and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut transactions = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let date_str = field(&record, Some(date_col));
        let amount_str = field(&record, Some(amount_col));

        // Statement exports pad with blank rows; skip them silently
        if date_str.is_empty() || amount_str.is_empty() {
            continue;
        }

        let (date, amount) = match (parse_date(&date_str), parse_amount(&amount_str)) {
            (Ok(d), Ok(a)) => (d, a),
            (date, amount) => {
                warn!(
                    row = ?record,
                    date_ok = date.is_ok(),
                    amount_ok = amount.is_ok(),
                    "Skipping unparseable statement row"
                );
                continue;
            }
        };

        let number = {
            let n = field(&record, number_col);
            if n.is_empty() { None } else { Some(n) }
        };
        let account = field(&record, account_col);
        let subcategory = field(&record, subcategory_col);
        let memo = field(&record, memo_col);

        let amount = amount.abs();
        let import_hash = generate_hash(
            &date,
            &account,
            amount,
            &subcategory,
            &memo,
            number.as_deref(),
        );

        transactions.push(NewRawTransaction {
            transaction_number: number,
            date,
            account,
            amount,
            subcategory,
            memo,
            import_hash,
        });
    }

    debug!("Parsed {} statement transactions", transactions.len());
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "\
Number,Date,Account,Amount,Subcategory,Memo
1,15/11/2024,Current Account,-54.99,Direct Debit,ACME INSURANCE ON 15 NOV BGC
2,17/11/2024,Current Account,2500.00,Counter Credit,EMPLOYER LTD SALARY
,,,,,
3,18/11/2024,Current Account,-12.40,Card Purchase,COFFEE HOUSE AMOUNT IN USD 15.20 USD
";

    #[test]
    fn parses_barclays_statement() {
        let txs = parse_statement_csv(STATEMENT.as_bytes()).unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 11, 15).unwrap());
        assert_eq!(txs[0].amount, 54.99);
        assert_eq!(txs[0].subcategory, "Direct Debit");
        assert_eq!(txs[1].amount, 2500.00);
        assert_eq!(txs[2].transaction_number.as_deref(), Some("3"));
    }

    #[test]
    fn amounts_are_stored_as_magnitudes() {
        let txs = parse_statement_csv(STATEMENT.as_bytes()).unwrap();
        assert!(txs.iter().all(|t| t.amount >= 0.0));
    }

    #[test]
    fn unparseable_rows_are_skipped_not_fatal() {
        let bad = "\
Number,Date,Account,Amount,Subcategory,Memo
1,not-a-date,Current Account,10.00,Debit,SHOP
2,15/11/2024,Current Account,10.00,Debit,SHOP
";
        let txs = parse_statement_csv(bad.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].memo, "SHOP");
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let bad = "Amount,Memo\n10.00,SHOP\n";
        assert!(parse_statement_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn hash_distinguishes_numbered_rows() {
        let same_day = "\
Number,Date,Account,Amount,Subcategory,Memo
10,15/11/2024,Current Account,9.99,Card Purchase,COFFEE HOUSE
11,15/11/2024,Current Account,9.99,Card Purchase,COFFEE HOUSE
";
        let txs = parse_statement_csv(same_day.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_ne!(txs[0].import_hash, txs[1].import_hash);
    }

    #[test]
    fn test_clean_merchant() {
        assert_eq!(
            clean_merchant("ACME INSURANCE ON 15 NOV BGC"),
            "ACME INSURANCE"
        );
        assert_eq!(
            clean_merchant("COFFEE HOUSE AMOUNT IN USD 15.20"),
            "COFFEE HOUSE"
        );
        assert_eq!(clean_merchant("NETFLIX.COM GBP"), "NETFLIX.COM");
        assert_eq!(clean_merchant(""), "");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("15/01/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("Jan 15").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-54.99").unwrap(), -54.99);
        assert_eq!(parse_amount("£1,250.00").unwrap(), 1250.0);
        assert!(parse_amount("n/a").is_err());
    }
}
