use chrono::Local;
use chrono::NaiveDateTime;
use uuid::Uuid;

pub trait IdProvider: Send {
    fn next_id(&mut self) -> String;
}

/// `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdProvider for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

pub trait Clock: Send {
    fn now(&self) -> NaiveDateTime;

    /// Display form used on messages, e.g. `10:32 AM`.
    fn timestamp(&self) -> String {
        self.now().format("%-I:%M %p").to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sequential_ids_are_monotonic() {
        let mut ids = SequentialIds::new("msg");
        assert_eq!(ids.next_id(), "msg-1");
        assert_eq!(ids.next_id(), "msg-2");
        assert_eq!(ids.next_id(), "msg-3");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn fixed_clock_formats_twelve_hour_time() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|date| date.and_hms_opt(10, 32, 0))
            .expect("valid time");
        assert_eq!(FixedClock(at).timestamp(), "10:32 AM");

        let at = NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|date| date.and_hms_opt(15, 5, 0))
            .expect("valid time");
        assert_eq!(FixedClock(at).timestamp(), "3:05 PM");
    }
}
