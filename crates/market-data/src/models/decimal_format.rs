//! Serde helpers for [`Decimal`] fields.
//!
//! Providers and venues send amounts either as JSON numbers or as strings.
//! Both are accepted on input; output is always a string so that no value
//! ever passes through binary floating point on its way out.

use rust_decimal::Decimal;
use serde::{self, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalOrString {
    Decimal(Decimal),
    String(String),
}

/// Parse a decimal from text, accepting scientific notation.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.normalize().to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match DecimalOrString::deserialize(deserializer)? {
        DecimalOrString::Decimal(d) => Ok(d),
        DecimalOrString::String(s) => parse_decimal(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal '{}'", s))),
    }
}

/// Same as the parent module, for `Option<Decimal>` fields.
pub mod option {
    use super::{parse_decimal, DecimalOrString};
    use rust_decimal::Decimal;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.normalize().to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<DecimalOrString>::deserialize(deserializer)? {
            Some(DecimalOrString::Decimal(d)) => Ok(Some(d)),
            Some(DecimalOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(DecimalOrString::String(s)) => parse_decimal(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal '{}'", s))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        value: Decimal,
        #[serde(default, with = "super::option")]
        fee: Option<Decimal>,
    }

    #[test]
    fn test_reads_numbers_and_strings() {
        let from_number: Holder = serde_json::from_str(r#"{"value": 10}"#).unwrap();
        assert_eq!(from_number.value, dec!(10));
        assert!(from_number.fee.is_none());

        let from_string: Holder =
            serde_json::from_str(r#"{"value": "0.00012345", "fee": "0.26"}"#).unwrap();
        assert_eq!(from_string.value, dec!(0.00012345));
        assert_eq!(from_string.fee, Some(dec!(0.26)));
    }

    #[test]
    fn test_reads_scientific_notation() {
        let holder: Holder = serde_json::from_str(r#"{"value": "1.5e-7"}"#).unwrap();
        assert_eq!(holder.value, dec!(0.00000015));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"value": "abc"}"#).is_err());
    }

    #[test]
    fn test_writes_strings() {
        let holder = Holder {
            value: dec!(20.50),
            fee: None,
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"value":"20.5","fee":null}"#);
    }
}
