//! A [`CounterStore`] backed by Redis.
//!
//! Slots are created with `SET key -1 NX PX <expiry>` and drawn from with
//! `INCR key`, so every process pointed at the same Redis instance shares one
//! sequence per `(region, machine, millisecond)` key.
//!
//! ```no_run
//! use dateflake::{BasicDateSnowflakeGenerator, Options, SystemClock};
//! use dateflake_redis::RedisCounterStore;
//!
//! let store = RedisCounterStore::open("redis://127.0.0.1/").unwrap();
//! let generator =
//!     BasicDateSnowflakeGenerator::new(Options::default().with_machine_id(4), store, SystemClock)
//!         .unwrap();
//! println!("{}", generator.id().unwrap());
//! ```

use core::time::Duration;

use dateflake::CounterStore;
use parking_lot::Mutex;
use redis::{Client, Connection, IntoConnectionInfo, RedisError, RedisResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub use redis;

/// A [`CounterStore`] over a single synchronous Redis connection.
///
/// The connection sits behind a mutex, so one store can be shared by every
/// generator in the process (wrap it in an [`Arc`]). Each command holds the
/// lock for one round trip.
///
/// [`Arc`]: std::sync::Arc
pub struct RedisCounterStore {
    conn: Mutex<Connection>,
}

impl RedisCounterStore {
    /// Connects to the Redis instance at `url`, e.g. `redis://127.0.0.1/`.
    ///
    /// # Errors
    ///
    /// Returns a [`RedisError`] if `url` is malformed or the connection
    /// cannot be established.
    pub fn open(url: impl IntoConnectionInfo) -> RedisResult<Self> {
        let conn = Client::open(url)?.get_connection()?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already established connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl CounterStore for RedisCounterStore {
    type Err = RedisError;

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    fn init_slot(&self, key: &str, expiry: Duration) -> Result<(), Self::Err> {
        let millis = u64::try_from(expiry.as_millis()).unwrap_or(u64::MAX);
        let mut conn = self.conn.lock();
        // `OK` when created, nil when the key already exists; both are fine.
        let _: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(dateflake::SLOT_INITIAL_VALUE)
            .arg("NX")
            .arg("PX")
            .arg(millis)
            .query(&mut *conn)?;
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    fn increment(&self, key: &str) -> Result<i64, Self::Err> {
        let mut conn = self.conn.lock();
        redis::cmd("INCR").arg(key).query(&mut *conn)
    }
}
