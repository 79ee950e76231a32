//! Macro for string-backed domain enums
//!
//! Priorities, triggers, involvement levels and similar enums travel as
//! lowercase snake_case strings (in JSON and in LLM output). This macro gives
//! each of them `as_str`, `Display` and a case-insensitive `FromStr` from one
//! variant table.
//!
//! # Example
//!
//! ```rust
//! use cadence_domain::impl_str_enum;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Level {
//!     Low,
//!     High,
//! }
//!
//! impl_str_enum!(Level {
//!     Low => "low",
//!     High => "high",
//! });
//!
//! assert_eq!(Level::High.as_str(), "high");
//! assert_eq!("LOW".parse::<Level>().unwrap(), Level::Low);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum.
///
/// Parsing trims surrounding whitespace and ignores ASCII case; unknown
/// values produce `Err(String)` naming the enum.
#[macro_export]
macro_rules! impl_str_enum {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Trigger {
        MeetingOverload,
        DeadlineChange,
    }

    impl_str_enum!(Trigger {
        MeetingOverload => "meeting_overload",
        DeadlineChange => "deadline_change",
    });

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(Trigger::MeetingOverload.to_string(), "meeting_overload");
        assert_eq!(Trigger::DeadlineChange.as_str(), "deadline_change");
    }

    #[test]
    fn parse_ignores_case_and_padding() {
        assert_eq!(Trigger::from_str(" Meeting_Overload ").unwrap(), Trigger::MeetingOverload);
        assert_eq!(Trigger::from_str("DEADLINE_CHANGE").unwrap(), Trigger::DeadlineChange);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = Trigger::from_str("overload").unwrap_err();
        assert!(err.contains("Invalid Trigger: overload"));
        assert!(Trigger::from_str("").is_err());
    }
}
