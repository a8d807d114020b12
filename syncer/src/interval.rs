use chrono::{DateTime, Utc};
use model::instance;
use std::time::Duration;

/// Resolve the effective sync interval for an instance. `None` means never:
/// deactivated instances, absent or invalid intervals, and the zero interval
/// all disable periodic sync.
pub fn effective_sync_interval(instance: &instance::Model) -> Option<Duration> {
    if !instance.activation {
        return None;
    }
    let interval = instance.options.sync_interval?;
    if !interval.is_valid() || interval.is_zero() {
        return None;
    }
    Some(interval.as_duration())
}

/// The stored timestamp if present, else the epoch origin so that a
/// never-synced subject is always due.
pub fn last_sync_time(t: Option<DateTime<Utc>>) -> DateTime<Utc> {
    t.unwrap_or(DateTime::UNIX_EPOCH)
}

/// Whether a subject owned by `instance` is due for a sync at `now`, given
/// the subject's own last sync time. Databases inherit the interval from
/// their instance but keep their own clock.
pub fn sync_due(
    instance: &instance::Model,
    last_sync: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let Some(interval) = effective_sync_interval(instance) else {
        return false;
    };
    let Ok(interval) = chrono::Duration::from_std(interval) else {
        return false;
    };
    match last_sync_time(last_sync).checked_add_signed(interval) {
        Some(next_sync_time) => now >= next_sync_time,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::engine::Engine;
    use model::instance::SyncDuration;
    use model::testing::instance_fixture;
    use proptest::prelude::*;

    fn instance_with_interval(interval: Option<SyncDuration>) -> instance::Model {
        let mut instance = instance_fixture("prod-mysql", Engine::Mysql);
        instance.options.sync_interval = interval;
        instance
    }

    #[test]
    fn never_when_deactivated() {
        let mut instance = instance_with_interval(Some(SyncDuration::from_secs(300)));
        instance.activation = false;
        assert_eq!(effective_sync_interval(&instance), None);
    }

    #[test]
    fn never_when_interval_absent_invalid_or_zero() {
        assert_eq!(effective_sync_interval(&instance_with_interval(None)), None);
        assert_eq!(
            effective_sync_interval(&instance_with_interval(Some(SyncDuration {
                seconds: -1,
                nanos: 0
            }))),
            None
        );
        assert_eq!(
            effective_sync_interval(&instance_with_interval(Some(SyncDuration {
                seconds: 0,
                nanos: 2_000_000_000
            }))),
            None
        );
        assert_eq!(
            effective_sync_interval(&instance_with_interval(Some(SyncDuration {
                seconds: 0,
                nanos: 0
            }))),
            None
        );
    }

    #[test]
    fn sub_second_intervals_are_kept() {
        let instance = instance_with_interval(Some(SyncDuration {
            seconds: 0,
            nanos: 500_000_000,
        }));
        assert_eq!(
            effective_sync_interval(&instance),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn missing_last_sync_means_due() {
        let instance = instance_with_interval(Some(SyncDuration::from_secs(300)));
        assert!(sync_due(&instance, None, Utc::now()));
    }

    #[test]
    fn due_exactly_at_the_boundary() {
        let instance = instance_with_interval(Some(SyncDuration::from_secs(300)));
        let last = Utc::now();
        assert!(!sync_due(&instance, Some(last), last));
        assert!(sync_due(
            &instance,
            Some(last),
            last + chrono::Duration::seconds(300)
        ));
        assert!(!sync_due(
            &instance,
            Some(last),
            last + chrono::Duration::seconds(299)
        ));
    }

    #[test]
    fn never_interval_is_never_due() {
        let instance = instance_with_interval(None);
        assert!(!sync_due(&instance, None, Utc::now()));
    }

    proptest! {
        /// An instance is due only if its interval resolves, regardless of
        /// what the stored duration looks like.
        #[test]
        fn due_implies_effective_interval(interval in model::testing::arb_sync_duration()) {
            let instance = instance_with_interval(Some(interval));
            let due = sync_due(&instance, None, Utc::now());
            prop_assert_eq!(due, effective_sync_interval(&instance).is_some());
        }
    }
}
