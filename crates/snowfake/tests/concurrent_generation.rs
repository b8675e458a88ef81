use snowfake::{base58, Layout, Snowfake, SnowfakeSettings};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 10;
const IDS_PER_THREAD: usize = 1_000;

fn generator(node_id: u64) -> Snowfake<snowfake::SystemClock> {
    let settings = SnowfakeSettings::builder().node_id(node_id).build();
    Snowfake::new(settings).unwrap()
}

#[test]
fn concurrent_calls_yield_distinct_ids() {
    let generator = Arc::new(generator(7));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                (0..IDS_PER_THREAD)
                    .map(|_| generator.next_id().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::with_capacity(THREADS * IDS_PER_THREAD);
    for handle in handles {
        for id in handle.join().unwrap() {
            assert_eq!(generator.decompose(id).node_id, 7);
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(ids.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn ids_from_one_thread_are_increasing() {
    let generator = generator(0);
    let ids: Vec<u64> = (0..1_000).map(|_| generator.next_id().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn exhausting_a_small_sequence_blocks_into_the_next_second() {
    let layout = Layout::new(32, 8, 2).unwrap();
    let settings = SnowfakeSettings::builder()
        .node_id(3)
        .layout(layout)
        .build();
    let generator = Snowfake::new(settings).unwrap();

    // Four ids per second: nine ids span at least three seconds.
    let ids: Vec<u64> = (0..9).map(|_| generator.next_id().unwrap()).collect();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    let first = generator.decompose(ids[0]).timestamp;
    let last = generator.decompose(ids[8]).timestamp;
    assert!(last >= first + 2);
}

#[test]
fn generated_ids_survive_base58() {
    let generator = generator(1);
    for _ in 0..100 {
        let id = generator.next_id().unwrap();
        let code = base58::encode(id);
        assert_eq!(base58::decode(&code), Ok(id));
    }
}

#[test]
fn generated_id_time_is_recent() {
    let generator = generator(0);
    let before = jiff::Timestamp::now().as_second();
    let id = generator.next_id().unwrap();
    let at = generator.timestamp_of(id).unwrap().as_second();
    assert!(at >= before - 1 && at <= jiff::Timestamp::now().as_second());
}
