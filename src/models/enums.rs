use serde::{Deserialize, Serialize};

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Confidence {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(InputKind {
    Delimited => "delimited",
    Text => "text",
    Image => "image",
});

str_enum!(ExtractionSource {
    Delimited => "delimited",
    Assistant => "assistant",
});

impl Default for Confidence {
    /// Rows that omit a tier are treated as unverified.
    fn default() -> Self {
        Self::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_round_trips_through_str() {
        for c in [Confidence::High, Confidence::Medium, Confidence::Low] {
            assert_eq!(c.as_str().parse::<Confidence>().unwrap(), c);
        }
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = "certain".parse::<Confidence>().unwrap_err();
        assert_eq!(err.field, "Confidence");
        assert_eq!(err.value, "certain");
    }

    #[test]
    fn input_kind_parses_wire_names() {
        assert_eq!("image".parse::<InputKind>().unwrap(), InputKind::Image);
        assert!("pdf".parse::<InputKind>().is_err());
    }
}
