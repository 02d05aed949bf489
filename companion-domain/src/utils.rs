use time::OffsetDateTime;

pub fn current_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn current_epoch_seconds() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub fn millis_to_epoch_seconds(ms: i64) -> i64 {
    ms.div_euclid(1000)
}
