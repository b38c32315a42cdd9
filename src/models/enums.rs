use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// String-mapped enum with `as_str` and `FromStr`, for DB and wire round-trips.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(IntentKind {
    Task => "TASK",
    Event => "EVENT",
    Transaction => "TRANSACTION",
});

str_enum!(Direction {
    Income => "INCOME",
    Expense => "EXPENSE",
});

str_enum!(ParseSource {
    SmartRule => "smart_rule",
    Assisted => "assisted",
    Fallback => "fallback",
});
