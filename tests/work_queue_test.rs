//! Exclusive draining of the work queue under contention

use entel_scrape::crawl_engine::WorkQueue;
use std::collections::HashSet;
use std::sync::Arc;

fn links(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("https://shop.test/item{i}")).collect()
}

fn assert_drained_exactly_once(taken: Vec<String>, expected: &[String]) {
    let unique: HashSet<&String> = taken.iter().collect();
    assert_eq!(unique.len(), taken.len(), "a link was handed out twice");
    assert_eq!(unique, expected.iter().collect::<HashSet<_>>());
}

#[test]
fn test_os_threads_never_share_a_link() {
    let input = links(5_000);
    let queue = Arc::new(WorkQueue::new(input.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                let mut mine = Vec::new();
                while let Some(link) = queue.take() {
                    mine.push(link);
                }
                mine
            })
        })
        .collect();

    let taken: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_drained_exactly_once(taken, &input);
    assert!(queue.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tokio_tasks_never_share_a_link() {
    let input = links(1_000);
    let queue = Arc::new(WorkQueue::new(input.clone()));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut mine = Vec::new();
                while let Some(link) = queue.take() {
                    mine.push(link);
                    tokio::task::yield_now().await;
                }
                mine
            })
        })
        .collect();

    let mut taken = Vec::new();
    for task in tasks {
        taken.extend(task.await.unwrap());
    }

    assert_drained_exactly_once(taken, &input);
}

#[test]
fn test_empty_queue() {
    let queue = WorkQueue::new(Vec::new());
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
    assert_eq!(queue.take(), None);
}
