use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::id::DateSnowflakeId;

/// Serializes as the decimal string form, e.g. `"2023081945298612176896"`.
///
/// IDs routinely exceed 2^53, so a string keeps them intact in JSON.
impl Serialize for DateSnowflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateSnowflakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl de::Visitor<'_> for IdVisitor {
            type Value = DateSnowflakeId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a date-prefixed decimal id string")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(de::Error::custom)
            }
        }

        d.deserialize_str(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ParseIdError;
    use serde_json::json;

    #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
    struct Row {
        order_id: DateSnowflakeId,
    }

    #[test]
    fn id_serializes_as_string() {
        let row = Row {
            order_id: DateSnowflakeId::from_parts(20_230_819, 45_298_612_176_896),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"order_id":"2023081945298612176896"}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn invalid_date_is_rejected() {
        let json = json!({"order_id": "202313011"});
        let err = serde_json::from_value::<Row>(json).expect_err("should fail");
        assert_eq!(
            err.to_string(),
            ParseIdError::InvalidDate { date: 20_231_301 }.to_string()
        );
    }

    #[test]
    fn numbers_are_rejected() {
        let json = json!({"order_id": 42});
        assert!(serde_json::from_value::<Row>(json).is_err());
    }
}
