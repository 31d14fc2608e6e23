use std::fs;

use extractor_engine::{JobQueue, QueueError, SpoolDirQueue};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn open_creates_the_spool_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("queue").join("extraction");
    let queue = SpoolDirQueue::open(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(queue.size().unwrap(), 0);
    assert_eq!(queue.get().unwrap(), None);
}

#[test]
fn jobs_come_out_in_enqueue_order() {
    let temp = TempDir::new().unwrap();
    let queue = SpoolDirQueue::open(temp.path()).unwrap();

    queue.enqueue("/data/a.pdf").unwrap();
    queue.enqueue("/data/b.docx").unwrap();
    queue.enqueue("/data/c.pdf").unwrap();
    assert_eq!(queue.size().unwrap(), 3);

    assert_eq!(queue.get().unwrap().as_deref(), Some("/data/a.pdf"));
    assert_eq!(queue.get().unwrap().as_deref(), Some("/data/b.docx"));
    assert_eq!(queue.get().unwrap().as_deref(), Some("/data/c.pdf"));
    assert_eq!(queue.get().unwrap(), None);
    assert_eq!(queue.size().unwrap(), 0);
}

#[test]
fn foreign_files_are_not_jobs() {
    let temp = TempDir::new().unwrap();
    let queue = SpoolDirQueue::open(temp.path()).unwrap();
    fs::write(temp.path().join("README"), "not a job").unwrap();
    fs::write(temp.path().join(".tmpXYZ"), "half written").unwrap();
    fs::create_dir(temp.path().join("nested.job")).unwrap();

    assert_eq!(queue.size().unwrap(), 0);
    assert_eq!(queue.get().unwrap(), None);
}

#[test]
fn producer_written_jobs_are_trimmed() {
    let temp = TempDir::new().unwrap();
    let queue = SpoolDirQueue::open(temp.path()).unwrap();
    fs::write(temp.path().join("0001.job"), "/data/report.pdf\n").unwrap();

    assert_eq!(queue.get().unwrap().as_deref(), Some("/data/report.pdf"));
}

#[test]
fn invalid_payload_is_dropped_with_an_error() {
    let temp = TempDir::new().unwrap();
    let queue = SpoolDirQueue::open(temp.path()).unwrap();
    fs::write(temp.path().join("0001.job"), [0xff, 0xfe, 0xfd]).unwrap();

    let err = queue.get().unwrap_err();
    assert!(matches!(err, QueueError::InvalidItem(_)));
    assert_eq!(queue.size().unwrap(), 0);
}

#[test]
fn competing_consumers_take_each_job_once() {
    let temp = TempDir::new().unwrap();
    let producer = SpoolDirQueue::open(temp.path()).unwrap();
    for i in 0..40 {
        producer.enqueue(&format!("/data/{i}.pdf")).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let consumer = SpoolDirQueue::open(temp.path()).unwrap();
            std::thread::spawn(move || {
                let mut taken = Vec::new();
                while let Some(item) = consumer.get().unwrap() {
                    taken.push(item);
                }
                taken
            })
        })
        .collect();

    let mut all: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(all.len(), 40);
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 40);
    assert_eq!(producer.size().unwrap(), 0);
}
