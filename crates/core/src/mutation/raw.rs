//! Wire format of the external mutation API.
//!
//! Field names follow the REST payload (camelCase); unknown fields are
//! ignored so new API fields do not break cached replays. Raw records are
//! stored untouched in the mutation cache and only interpreted by
//! [`super::model::Mutation::from_raw`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw mutation record as returned by the bookkeeping API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMutation {
    /// External mutation number.
    pub id: i64,
    /// Numeric mutation type code.
    #[serde(rename = "type")]
    pub mutation_type: i32,
    /// Posting date.
    #[serde(with = "api_date")]
    pub date: NaiveDate,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Main ledger code (bank account for payments, source for memorials).
    #[serde(default)]
    pub ledger_id: Option<i64>,
    /// Relation (party) code.
    #[serde(default)]
    pub relation_id: Option<String>,
    /// Invoice number, set on invoices and on payments that settle one.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Header amount; zero or absent for multi-row mutations.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Row entries (counter-ledger postings).
    #[serde(default)]
    pub rows: Vec<RawRow>,
    /// VAT lines.
    #[serde(default)]
    pub vat: Vec<RawVatLine>,
}

/// A single row entry of a raw mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// Ledger code of the row account.
    #[serde(default)]
    pub ledger_id: Option<i64>,
    /// Signed row amount.
    pub amount: Decimal,
    /// Row description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A VAT line of a raw mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVatLine {
    /// VAT code as reported by the source system.
    #[serde(default)]
    pub code: Option<String>,
    /// Signed VAT amount.
    pub amount: Decimal,
}

/// Date (de)serialization for the API's date fields.
///
/// The API reports plain dates on some endpoints and full timestamps
/// (`2024-01-15T00:00:00`) on others; only the date part is meaningful.
mod api_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let date_part = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(date_part, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_deserialize_full_payload() {
        let json = r#"{
            "id": 7296,
            "type": 1,
            "date": "2024-03-07",
            "description": "Factuur kantoorartikelen",
            "ledgerId": 13201865,
            "relationId": "REL-0042",
            "invoiceNumber": "2024-0317",
            "rows": [{"ledgerId": 31760397, "amount": 113.08, "description": "Kantoor"}],
            "vat": []
        }"#;
        let raw: RawMutation = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, 7296);
        assert_eq!(raw.mutation_type, 1);
        assert_eq!(raw.rows.len(), 1);
        assert_eq!(raw.rows[0].amount, dec!(113.08));
        assert_eq!(raw.rows[0].ledger_id, Some(31_760_397));
    }

    #[test]
    fn test_deserialize_timestamp_date() {
        let json = r#"{"id": 1, "type": 7, "date": "2023-12-31T00:00:00", "rows": []}"#;
        let raw: RawMutation = serde_json::from_str(json).unwrap();
        assert_eq!(
            raw.date,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let json = r#"{"id": 2, "type": 5, "date": "2024-01-02", "amount": 25.00}"#;
        let raw: RawMutation = serde_json::from_str(json).unwrap();
        assert!(raw.rows.is_empty());
        assert!(raw.vat.is_empty());
        assert_eq!(raw.amount, Some(dec!(25.00)));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"id": 3, "type": 2, "date": "2024-01-02", "inExVat": "EX"}"#;
        assert!(serde_json::from_str::<RawMutation>(json).is_ok());
    }

    #[test]
    fn test_roundtrip_preserves_content() {
        let raw = RawMutation {
            id: 9,
            mutation_type: 7,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: Some("Memoriaal".to_string()),
            ledger_id: Some(100),
            relation_id: None,
            invoice_number: None,
            amount: None,
            rows: vec![RawRow {
                ledger_id: Some(200),
                amount: dec!(-12.50),
                description: None,
            }],
            vat: vec![],
        };
        let json = serde_json::to_string(&raw).unwrap();
        let back: RawMutation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raw);
    }
}
