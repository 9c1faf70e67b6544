//! Runs against a live Redis at `REDIS_URL` (default `redis://127.0.0.1/`).
//!
//! ```bash
//! cargo test -p dateflake-redis -- --ignored
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::thread::scope;
use std::time::Duration;

use dateflake::{
    CounterStore, DateSnowflakeId, LockDateSnowflakeGenerator, Options, SLOT_EXPIRY, SystemClock,
};
use dateflake_redis::RedisCounterStore;
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .with_test_writer()
            .init();
    });
}

fn store() -> RedisCounterStore {
    init_tracing();
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_owned());
    RedisCounterStore::open(url.as_str()).expect("redis reachable")
}

fn unique_key(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("dateflake:test:{name}:{nanos}")
}

#[test]
#[ignore = "requires a running redis server"]
fn init_then_increment_starts_at_zero() {
    let store = store();
    let key = unique_key("init");

    store.init_slot(&key, SLOT_EXPIRY).unwrap();
    assert_eq!(store.increment(&key).unwrap(), 0);
    assert_eq!(store.increment(&key).unwrap(), 1);

    // A second init leaves the running counter alone.
    store.init_slot(&key, SLOT_EXPIRY).unwrap();
    assert_eq!(store.increment(&key).unwrap(), 2);
}

#[test]
#[ignore = "requires a running redis server"]
fn initialized_slots_expire() {
    let store = store();
    let key = unique_key("expiry");

    store.init_slot(&key, Duration::from_millis(50)).unwrap();
    assert_eq!(store.increment(&key).unwrap(), 0);

    std::thread::sleep(Duration::from_millis(150));
    store.init_slot(&key, Duration::from_millis(50)).unwrap();
    assert_eq!(store.increment(&key).unwrap(), 0);
}

#[test]
#[ignore = "requires a running redis server"]
fn generators_in_separate_connections_stay_unique() {
    const THREADS: u64 = 4;
    const IDS_PER_THREAD: usize = 2_000;

    let prefix = format!("{}:", unique_key("generators"));
    let seen_ids = shared_set();

    scope(|s| {
        for _ in 0..THREADS {
            let seen_ids = Arc::clone(&seen_ids);
            let prefix = prefix.clone();
            s.spawn(move || {
                // Every thread shares one tag but has its own connection, like
                // separate processes would.
                let generator = LockDateSnowflakeGenerator::new(
                    Options::default().with_machine_id(3).with_key_prefix(prefix),
                    store(),
                    SystemClock,
                )
                .unwrap();
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.try_next_id(|_| std::thread::yield_now()).unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let total = seen_ids.lock().unwrap().len();
    assert_eq!(total, THREADS as usize * IDS_PER_THREAD);
}

fn shared_set() -> Arc<Mutex<HashSet<DateSnowflakeId>>> {
    Arc::new(Mutex::new(HashSet::new()))
}
