//! Topic patterns.
//!
//! A topic is eight key bytes. Each key is a bitmask over the letters
//! `a`..`h`, so a single key can name several letters at once and two keys
//! match when they are identical or share at least one letter.
//!
//! Textual form is up to eight `.`-separated tokens:
//!
//! - `[a-h]+` sets the bit of every letter in the token
//! - `*` matches anything at that position (`0xFF`)
//! - `>` matches anything at that position and every later one; it must be
//!   the last token

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of key bytes in a topic.
pub const TOPIC_KEYS: usize = 8;

const WILDCARD: u8 = 0xFF;

/// Error returned when a topic string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicError {
    #[error("topic is empty")]
    Empty,

    #[error("topic has more than 8 tokens")]
    TooManyTokens,

    #[error("topic has empty token (e.g. consecutive dots or leading/trailing dot)")]
    EmptyToken,

    #[error("'>' wildcard must be the last token")]
    TailNotLast,

    #[error("token '{token}' contains invalid char '{ch}' (allowed: a..h, '*', '>')")]
    InvalidChar { token: String, ch: char },
}

/// An eight-key topic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Topic {
    keys: [u8; TOPIC_KEYS],
}

impl Topic {
    /// Topic of a client that has not subscribed to anything.
    pub const EMPTY: Self = Self {
        keys: [0; TOPIC_KEYS],
    };

    /// Build a topic from raw key bytes.
    #[must_use]
    pub const fn from_keys(keys: [u8; TOPIC_KEYS]) -> Self {
        Self { keys }
    }

    /// Raw key bytes, as they appear on the wire.
    #[must_use]
    pub const fn keys(&self) -> [u8; TOPIC_KEYS] {
        self.keys
    }

    /// Parse a topic pattern such as `a.b.f` or `a.*.>`.
    pub fn parse(s: &str) -> Result<Self, TopicError> {
        if s.is_empty() {
            return Err(TopicError::Empty);
        }

        let tokens: Vec<&str> = s.split('.').collect();
        if tokens.len() > TOPIC_KEYS {
            return Err(TopicError::TooManyTokens);
        }

        let mut keys = [0u8; TOPIC_KEYS];
        let last = tokens.len() - 1;
        for (idx, token) in tokens.iter().enumerate() {
            match *token {
                "" => return Err(TopicError::EmptyToken),
                "*" => keys[idx] = WILDCARD,
                ">" => {
                    if idx != last {
                        return Err(TopicError::TailNotLast);
                    }
                    keys[idx..].fill(WILDCARD);
                }
                letters => {
                    for ch in letters.chars() {
                        if !('a'..='h').contains(&ch) {
                            return Err(TopicError::InvalidChar {
                                token: letters.to_string(),
                                ch,
                            });
                        }
                        keys[idx] |= 1 << (ch as u8 - b'a');
                    }
                }
            }
        }

        Ok(Self { keys })
    }

    /// Whether two topics overlap at every key position.
    ///
    /// Keys overlap when they are equal or share at least one letter bit.
    /// The relation is symmetric.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.keys
            .iter()
            .zip(other.keys.iter())
            .all(|(a, b)| a == b || a & b != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl FromStr for Topic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Topic {
    /// Render the pattern form. Trailing empty keys are dropped and a run
    /// of trailing wildcards collapses to `>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self
            .keys
            .iter()
            .rposition(|k| *k != 0)
            .map_or(0, |pos| pos + 1);
        if used == 0 {
            return f.write_str("-");
        }

        let tail_start = if used == TOPIC_KEYS {
            let run = self.keys.iter().rev().take_while(|k| **k == WILDCARD).count();
            // A single trailing wildcard reads better as `*`
            (run > 1).then_some(TOPIC_KEYS - run)
        } else {
            None
        };

        for (idx, key) in self.keys[..used].iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            if Some(idx) == tail_start {
                return f.write_str(">");
            }
            if *key == WILDCARD {
                f.write_str("*")?;
                continue;
            }
            for bit in 0..8u8 {
                if key & (1 << bit) != 0 {
                    write!(f, "{}", char::from(b'a' + bit))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        let topic = Topic::parse("a.b.f").unwrap();
        assert_eq!(topic.keys(), [0x01, 0x02, 0x20, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_parse_combined_letters() {
        let topic = Topic::parse("ab.h").unwrap();
        assert_eq!(topic.keys(), [0x03, 0x80, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_parse_wildcards() {
        let star = Topic::parse("a.*.c").unwrap();
        assert_eq!(star.keys(), [0x01, 0xFF, 0x04, 0, 0, 0, 0, 0]);

        let tail = Topic::parse("a.b.>").unwrap();
        assert_eq!(
            tail.keys(),
            [0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_parse_full_length() {
        let topic = Topic::parse("a.b.f.a.c.e.g.h").unwrap();
        assert_eq!(
            topic.keys(),
            [0x01, 0x02, 0x20, 0x01, 0x04, 0x10, 0x40, 0x80]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Topic::parse(""), Err(TopicError::Empty));
        assert_eq!(
            Topic::parse("a.b.c.d.e.f.g.h.a"),
            Err(TopicError::TooManyTokens)
        );
        assert_eq!(Topic::parse("a..b"), Err(TopicError::EmptyToken));
        assert_eq!(Topic::parse(".a"), Err(TopicError::EmptyToken));
        assert_eq!(Topic::parse("a."), Err(TopicError::EmptyToken));
        assert_eq!(Topic::parse("a.>.b"), Err(TopicError::TailNotLast));
        assert_eq!(
            Topic::parse("a.xyz"),
            Err(TopicError::InvalidChar {
                token: "xyz".to_string(),
                ch: 'x'
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Topic::parse("a.i").unwrap_err();
        assert_eq!(
            err.to_string(),
            "token 'i' contains invalid char 'i' (allowed: a..h, '*', '>')"
        );
    }

    #[test]
    fn test_matches_exact_and_overlap() {
        let published = Topic::parse("a.b.f.a.c.e.g.h").unwrap();
        assert!(published.matches(&published));

        let subscription = Topic::parse("a.b.>").unwrap();
        assert!(subscription.matches(&published));
        assert!(published.matches(&subscription));

        let overlap = Topic::parse("ab.b.f.a.c.e.g.h").unwrap();
        assert!(overlap.matches(&published));
    }

    #[test]
    fn test_matches_rejects_disjoint_keys() {
        let published = Topic::parse("a.b.c").unwrap();
        assert!(!Topic::parse("a.c.c").unwrap().matches(&published));
        // Shorter pattern leaves zero keys that only match zero keys
        assert!(!Topic::parse("a").unwrap().matches(&Topic::parse("a.b").unwrap()));
    }

    #[test]
    fn test_empty_topic_matches_only_empty() {
        assert!(Topic::EMPTY.matches(&Topic::EMPTY));
        assert!(!Topic::EMPTY.matches(&Topic::parse("a").unwrap()));
        assert!(Topic::EMPTY.is_empty());
    }

    #[test]
    fn test_display_round_trips_patterns() {
        for pattern in ["a.b.f", "ab.*.c", "a.b.>", "a.b.f.a.c.e.g.h"] {
            let topic = Topic::parse(pattern).unwrap();
            assert_eq!(topic.to_string(), pattern);
        }
        assert_eq!(Topic::EMPTY.to_string(), "-");
    }

    #[test]
    fn test_from_str() {
        let topic: Topic = "c.d".parse().unwrap();
        assert_eq!(topic, Topic::parse("c.d").unwrap());
    }
}
