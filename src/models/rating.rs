use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted rating state for one movie
///
/// The API snapshot is taken the first time the movie's remote aggregate is
/// seen and is never replaced afterwards; only `user_ratings` mutates.
/// Records written before snapshots existed deserialize with both fields
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    #[serde(default)]
    pub user_ratings: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_vote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_rating: Option<f64>,
}

impl RatingRecord {
    pub fn has_snapshot(&self) -> bool {
        self.api_vote_count.is_some() && self.api_rating.is_some()
    }

    /// Records the remote aggregate unless a snapshot already exists.
    /// Returns true when the record changed.
    pub fn snapshot(&mut self, remote: &RemoteAggregate) -> bool {
        if self.has_snapshot() {
            return false;
        }
        self.api_vote_count = Some(remote.vote_count);
        self.api_rating = Some(remote.vote_average);
        true
    }

    pub fn api_vote_count(&self) -> u64 {
        self.api_vote_count.unwrap_or(0)
    }

    pub fn api_rating(&self) -> f64 {
        self.api_rating.unwrap_or(0.0)
    }
}

/// Aggregate rating as reported by the remote catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteAggregate {
    pub vote_average: f64,
    pub vote_count: u64,
}

/// Blended rating view of one movie for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub blended_rating: f64,
    pub total_ratings: u64,
    pub distribution: BTreeMap<u8, u64>,
    pub user_rating: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_without_snapshot() {
        let record: RatingRecord =
            serde_json::from_str(r#"{"userRatings":{"user1":4},"totalRatings":1}"#).unwrap();
        assert_eq!(record.user_ratings.get("user1"), Some(&4));
        assert!(!record.has_snapshot());
    }

    #[test]
    fn test_snapshot_taken_once() {
        let mut record = RatingRecord::default();
        let first = RemoteAggregate {
            vote_average: 7.5,
            vote_count: 200,
        };
        let later = RemoteAggregate {
            vote_average: 6.0,
            vote_count: 900,
        };

        assert!(record.snapshot(&first));
        assert!(!record.snapshot(&later));
        assert_eq!(record.api_vote_count(), 200);
        assert_eq!(record.api_rating(), 7.5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut record = RatingRecord::default();
        record.user_ratings.insert("user1".to_string(), 5);
        record.snapshot(&RemoteAggregate {
            vote_average: 7.0,
            vote_count: 100,
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userRatings"]["user1"], 5);
        assert_eq!(json["apiVoteCount"], 100);
        assert_eq!(json["apiRating"], 7.0);
    }
}
