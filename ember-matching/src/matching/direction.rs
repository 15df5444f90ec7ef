use serde::{Deserialize, Serialize};

/// One user's verdict on another. Only positive directions can ever
/// produce a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Like,
    Dislike,
    Superlike,
}

impl SwipeDirection {
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Like | Self::Superlike)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Superlike => "superlike",
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "superlike" => Ok(Self::Superlike),
            _ => Err(format!("unknown swipe direction: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positivity() {
        assert!(SwipeDirection::Like.is_positive());
        assert!(SwipeDirection::Superlike.is_positive());
        assert!(!SwipeDirection::Dislike.is_positive());
    }

    #[test]
    fn round_trips_through_strings() {
        for d in [SwipeDirection::Like, SwipeDirection::Dislike, SwipeDirection::Superlike] {
            assert_eq!(d.as_str().parse::<SwipeDirection>().unwrap(), d);
        }
        assert!("swipe-up".parse::<SwipeDirection>().is_err());
    }
}
