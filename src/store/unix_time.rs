//! Serde encoding of `SystemTime` as signed seconds plus nanoseconds since the Unix epoch.
//!
//! serde's own `SystemTime` impl cannot represent times before 1970, which a jar's
//! mtime may legitimately be.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// `nanos` is always in `0..1_000_000_000` and counts forward from `secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct UnixTime {
    secs: i64,
    nanos: u32,
}

fn to_unix(time: SystemTime) -> Option<UnixTime> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => Some(UnixTime {
            secs: i64::try_from(after.as_secs()).ok()?,
            nanos: after.subsec_nanos(),
        }),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            if before.subsec_nanos() == 0 {
                Some(UnixTime {
                    secs: -secs,
                    nanos: 0,
                })
            } else {
                Some(UnixTime {
                    secs: (-secs).checked_sub(1)?,
                    nanos: NANOS_PER_SEC - before.subsec_nanos(),
                })
            }
        }
    }
}

fn from_unix(t: UnixTime) -> Option<SystemTime> {
    if t.nanos >= NANOS_PER_SEC {
        return None;
    }
    let whole = if t.secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::from_secs(t.secs.unsigned_abs()))?
    } else {
        UNIX_EPOCH.checked_sub(Duration::from_secs(t.secs.unsigned_abs()))?
    };
    whole.checked_add(Duration::from_nanos(u64::from(t.nanos)))
}

pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    to_unix(*time)
        .ok_or_else(|| S::Error::custom("timestamp out of range"))?
        .serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
    let raw = UnixTime::deserialize(deserializer)?;
    from_unix(raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp {raw:?}")))
}
