//! Fixed-window quotas such as `60/minute`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::RateLimitError;

/// At most `limit` requests per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub period: Duration,
}

impl Quota {
    pub const fn per_second(limit: u32) -> Self {
        Self {
            limit,
            period: Duration::from_secs(1),
        }
    }

    pub const fn per_minute(limit: u32) -> Self {
        Self {
            limit,
            period: Duration::from_secs(60),
        }
    }

    /// Window length in whole seconds (at least 1).
    pub fn period_secs(&self) -> u64 {
        self.period.as_secs().max(1)
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

impl FromStr for Quota {
    type Err = RateLimitError;

    /// Parse `N/unit` or `N per unit`, where unit is second, minute, hour or
    /// day (singular, plural or abbreviated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RateLimitError::InvalidQuota(s.to_string());
        let lower = s.trim().to_lowercase();

        let (count, unit) = lower
            .split_once('/')
            .or_else(|| lower.split_once(" per "))
            .ok_or_else(invalid)?;

        let limit: u32 = count.trim().parse().map_err(|_| invalid())?;
        if limit == 0 {
            return Err(invalid());
        }

        let secs = match unit.trim() {
            "s" | "sec" | "second" | "seconds" => 1,
            "m" | "min" | "minute" | "minutes" => 60,
            "h" | "hour" | "hours" => 3600,
            "d" | "day" | "days" => 86400,
            _ => return Err(invalid()),
        };

        Ok(Self {
            limit,
            period: Duration::from_secs(secs),
        })
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.period.as_secs() {
            1 => "second",
            60 => "minute",
            3600 => "hour",
            86400 => "day",
            secs => return write!(f, "{}/{}s", self.limit, secs),
        };
        write!(f, "{}/{}", self.limit, unit)
    }
}
