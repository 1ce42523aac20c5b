//! Shared wire formats: calendar dates as `YYYY-MM-DD`, clock times as `HH:MM`,
//! and text-backed enums that travel the same way through JSON and SQL.

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(pub hh_mm, Time, "[hour]:[minute]");

/// Declares a closed set of lowercase string values.
///
/// The generated enum serializes as its text, parses with `FromStr` and maps
/// onto a Postgres `TEXT` column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => anyhow::bail!("unknown {} value: {}", stringify!($name), other),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                text.parse::<$name>().map_err(Into::into)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub(crate) use text_enum;

/// Trims user text, turning blank input into `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use time::macros::{date, time};

    text_enum! {
        pub enum Tide {
            High => "high",
            SlackWater => "slack_water",
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "iso_date")]
        day: time::Date,
        #[serde(with = "hh_mm")]
        at: time::Time,
    }

    #[test]
    fn dates_and_times_use_short_formats() {
        let slot = Slot {
            day: date!(2025 - 07 - 04),
            at: time!(9:30),
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json, serde_json::json!({"day": "2025-07-04", "at": "09:30"}));

        let back: Slot = serde_json::from_value(json).unwrap();
        assert_eq!(back.day, date!(2025 - 07 - 04));
        assert_eq!(back.at, time!(9:30));
    }

    #[test]
    fn text_enum_parses_and_prints() {
        assert_eq!("slack_water".parse::<Tide>().unwrap(), Tide::SlackWater);
        assert_eq!(Tide::High.to_string(), "high");
        assert_eq!(
            serde_json::to_string(&Tide::SlackWater).unwrap(),
            "\"slack_water\""
        );
        assert!("ebb".parse::<Tide>().is_err());
        assert_eq!(Tide::ALL.len(), 2);
    }

    #[test]
    fn clean_optional_drops_blank() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" hi ".into())), Some("hi".into()));
        assert_eq!(clean_optional(None), None);
    }
}
