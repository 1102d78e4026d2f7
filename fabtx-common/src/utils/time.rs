use chrono::Utc;

use crate::protos::common::Timestamp;

/// Current wall-clock time as a wire [`Timestamp`].
pub fn now_timestamp() -> Timestamp {
    let now = Utc::now();
    Timestamp {
        seconds: now.timestamp(),
        nanos: now.timestamp_subsec_nanos() as i32,
    }
}
