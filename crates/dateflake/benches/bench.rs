use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use dateflake::{
    BasicDateSnowflakeGenerator, DateSnowflakeGenerator, LockDateSnowflakeGenerator,
    MemoryCounterStore, Options, Poll, SystemClock, TimeSource, UtcCalendar,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

#[derive(Clone, Copy)]
struct FixedMockTime {
    millis: u64,
}

impl TimeSource<u64> for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration. Matches one millisecond's
// sequence space under the default layout, so a fixed clock never stalls.
const TOTAL_IDS: usize = 2048;

/// 2023-08-19T12:00:00.123Z
const FIXED: FixedMockTime = FixedMockTime {
    millis: 1_692_446_400_123,
};

type MockStore = Arc<MemoryCounterStore<FixedMockTime>>;

fn mock_store() -> MockStore {
    Arc::new(MemoryCounterStore::new(FIXED))
}

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: DateSnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id() {
                        Ok(Poll::Ready { id }) => {
                            black_box(id);
                        }
                        Ok(Poll::Pending { .. }) | Err(_) => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks generators that may wait on exhausted milliseconds (realistic
/// wallclock behavior).
fn bench_generator_yield<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: DateSnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    let id = generator.try_next_id(|_| core::hint::spin_loop());
                    black_box(id.is_ok());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a shared generator across threads.
fn bench_generator_contended<G>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> G)
where
    G: DateSnowflakeGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_fn());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    let id = generator.try_next_id(|_| std::thread::yield_now());
                                    black_box(id.is_ok());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

// --- FIXED CLOCK ---

fn benchmark_mock_sequential_basic(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/basic", || {
        BasicDateSnowflakeGenerator::with_calendar(
            Options::default(),
            mock_store(),
            FIXED,
            UtcCalendar::utc(),
        )
        .unwrap()
    });
}

fn benchmark_mock_sequential_lock(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", || {
        LockDateSnowflakeGenerator::with_calendar(
            Options::default(),
            mock_store(),
            FIXED,
            UtcCalendar::utc(),
        )
        .unwrap()
    });
}

/// Multithreaded benchmark for `LockDateSnowflakeGenerator` with a fixed
/// clock. Every thread contends on the generator lock and the store lock.
fn benchmark_mock_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        LockDateSnowflakeGenerator::with_calendar(
            Options::default(),
            mock_store(),
            FIXED,
            UtcCalendar::utc(),
        )
        .unwrap()
    });
}

// --- SYSTEM CLOCK (realistic time with potential waiting) ---

fn benchmark_system_sequential_basic(c: &mut Criterion) {
    let store = Arc::new(MemoryCounterStore::default());
    bench_generator_yield(c, "system/sequential/basic", || {
        BasicDateSnowflakeGenerator::new(Options::default(), Arc::clone(&store), SystemClock)
            .unwrap()
    });
}

fn benchmark_system_sequential_lock(c: &mut Criterion) {
    let store = Arc::new(MemoryCounterStore::default());
    bench_generator_yield(c, "system/sequential/lock", || {
        LockDateSnowflakeGenerator::new(Options::default(), Arc::clone(&store), SystemClock)
            .unwrap()
    });
}

fn benchmark_system_contended_lock(c: &mut Criterion) {
    let store = Arc::new(MemoryCounterStore::default());
    bench_generator_contended(c, "system/contended/lock", || {
        LockDateSnowflakeGenerator::new(Options::default(), Arc::clone(&store), SystemClock)
            .unwrap()
    });
}

// --- FORMATTING ---

fn benchmark_id_to_string(c: &mut Criterion) {
    let generator = BasicDateSnowflakeGenerator::with_calendar(
        Options::default(),
        mock_store(),
        FIXED,
        UtcCalendar::utc(),
    )
    .unwrap();
    let Ok(Poll::Ready { id }) = generator.try_poll_id() else {
        unreachable!()
    };

    let mut group = c.benchmark_group("format");
    group.throughput(Throughput::Elements(1));
    group.bench_function("to_string", |b| b.iter(|| black_box(id).to_string()));
    group.bench_function("parse", |b| {
        let text = id.to_string();
        b.iter(|| black_box(text.as_str()).parse::<dateflake::DateSnowflakeId>());
    });
    group.finish();
}

criterion_group!(
    benches,
    // Fixed clock
    benchmark_mock_sequential_basic,
    benchmark_mock_sequential_lock,
    benchmark_mock_contended_lock,
    // System clock (waiting)
    benchmark_system_sequential_basic,
    benchmark_system_sequential_lock,
    benchmark_system_contended_lock,
    // Text form
    benchmark_id_to_string,
);
criterion_main!(benches);
