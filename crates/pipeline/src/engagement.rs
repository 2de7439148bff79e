//! Engagement ratio: interactions normalized by audience size.

use data_model::TweetRecord;

/// `(favorites + retweets + replies) / followers`, or 0 for an author with
/// no followers. Never negative.
pub fn engagement(record: &TweetRecord) -> f64 {
    if record.author_follower_count == 0 {
        return 0.0;
    }
    record.interactions() as f64 / record.author_follower_count as f64
}
