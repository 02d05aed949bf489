// Dedup key value object

use std::fmt;

use crate::entities::ActivityRecord;

/// Identity of one logical in-game occurrence.
///
/// Built from the subject name and the occurrence bucket the record falls
/// into. Drop records also carry the item name, so a kill and the drop it
/// produced never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(subject_name: &str, bucket: i64, drop_name: Option<&str>) -> Self {
        let subject = normalize(subject_name);
        match drop_name {
            Some(drop) => Self(format!("{}|drop:{}|{}", subject, normalize(drop), bucket)),
            None => Self(format!("{}|kill|{}", subject, bucket)),
        }
    }

    pub fn for_record(record: &ActivityRecord, bucket_seconds: i64) -> Self {
        let bucket = record
            .occurred_at_epoch_seconds()
            .div_euclid(bucket_seconds.max(1));
        Self::new(record.subject_name(), bucket, record.drop_name())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
