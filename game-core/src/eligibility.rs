use chrono::{DateTime, Datelike, Local, NaiveTime, TimeDelta, TimeZone, Utc};

/// One play per calendar day, where the calendar is the one of time zone `Tz`.
///
/// This is a day-boundary rule, not a rolling 24 hour window: a play at 23:59
/// does not block a play at 00:01 the next day.
#[derive(Debug, Clone)]
pub struct EligibilityGate<Tz = Local> {
    tz: Tz,
}

impl EligibilityGate<Local> {
    /// Gate evaluated in the time zone of the running process.
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for EligibilityGate<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> EligibilityGate<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Compare year, then month, then day of month in the gate's time zone.
    pub fn same_calendar_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        let a = a.with_timezone(&self.tz);
        let b = b.with_timezone(&self.tz);
        a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
    }

    pub fn can_play(&self, last_played: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_played {
            None => true,
            Some(last_played) => !self.same_calendar_day(last_played, now),
        }
    }

    /// When the player may spin again, or `None` if they may spin now.
    pub fn next_eligible_at(
        &self,
        last_played: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if self.can_play(last_played, now) {
            return None;
        }

        let tomorrow = now.with_timezone(&self.tz).date_naive().succ_opt()?;
        let midnight = tomorrow.and_time(NaiveTime::MIN);

        // Midnight can fall into a DST gap; the day then starts an hour later.
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(midnight + TimeDelta::hours(1)))
                    .earliest()
            })
            .map(|start| start.with_timezone(&Utc))
    }
}

/// [`EligibilityGate::can_play`] in the process time zone.
pub fn can_play(last_played: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    EligibilityGate::local().can_play(last_played, now)
}
