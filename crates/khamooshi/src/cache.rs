use chrono::{DateTime, Local, TimeDelta};

#[derive(Debug, Clone)]
struct CachedPage {
    time: DateTime<Local>,
    value: String,
}

/// Single-slot cache for the fetched outage page.
///
/// An entry is served while it is younger than the TTL and was stored on the
/// same local calendar day; the upstream table is republished daily.
#[derive(Debug, Clone)]
pub struct PageCache {
    ttl: TimeDelta,
    slot: Option<CachedPage>,
}

impl PageCache {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { ttl, slot: None }
    }

    pub fn get(&self, now: DateTime<Local>) -> Option<&str> {
        let cached = self.slot.as_ref()?;

        let fresh = now - cached.time < self.ttl;
        let same_day = now.date_naive() == cached.time.date_naive();

        if fresh && same_day {
            Some(&cached.value)
        } else {
            None
        }
    }

    pub fn set(&mut self, value: String, now: DateTime<Local>) {
        self.slot = Some(CachedPage { time: now, value });
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 26, h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = PageCache::new(TimeDelta::hours(1));
        assert!(cache.is_empty());
        assert_eq!(cache.get(at(10, 0)), None);
    }

    #[test]
    fn test_serves_within_ttl() {
        let mut cache = PageCache::new(TimeDelta::hours(1));
        cache.set("<html>cached</html>".to_string(), at(10, 0));

        assert_eq!(cache.get(at(10, 0)), Some("<html>cached</html>"));
        assert_eq!(cache.get(at(10, 59)), Some("<html>cached</html>"));
    }

    #[test]
    fn test_expires_after_ttl() {
        let mut cache = PageCache::new(TimeDelta::hours(1));
        cache.set("<html>expired</html>".to_string(), at(10, 0));

        assert_eq!(cache.get(at(11, 0)), None);
        assert_eq!(cache.get(at(12, 30)), None);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_expires_on_day_change() {
        let mut cache = PageCache::new(TimeDelta::hours(1));
        cache.set("<html>yesterday</html>".to_string(), at(23, 50));

        let after_midnight = Local.with_ymd_and_hms(2025, 8, 27, 0, 5, 0).unwrap();
        assert!(after_midnight - at(23, 50) < TimeDelta::hours(1));
        assert_eq!(cache.get(after_midnight), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut cache = PageCache::new(TimeDelta::hours(1));
        cache.set("old".to_string(), at(8, 0));
        cache.set("new".to_string(), at(10, 0));
        assert_eq!(cache.get(at(10, 30)), Some("new"));
    }
}
