use zentra_config::MonitorConfig;
use zentra_ledger::{Address, MemoryLedger};
use zentra_monitor::{EventMonitor, Watermark};

fn monitor(window: u64, lookback: u64) -> EventMonitor {
  EventMonitor::new(&MonitorConfig { window, lookback })
}

fn ledger() -> MemoryLedger {
  MemoryLedger::new(Address::repeat_byte(0x11))
}

#[tokio::test]
async fn test_cold_start_scans_lookback_window() {
  let ledger = ledger();
  ledger.set_height(1_000);
  ledger.create_task(MemoryLedger::open_task(1, "old"), 900);
  ledger.create_task(MemoryLedger::open_task(2, "recent"), 950);

  let mut watermark = Watermark::new();
  let events = monitor(75, 75).poll(&ledger, &mut watermark).await.unwrap();

  // Lookback starts at 925, so the block-900 task is never seen.
  assert_eq!(events.iter().map(|e| e.task_id).collect::<Vec<_>>(), vec![2]);
  assert_eq!(watermark.height(), Some(1_000));
}

#[tokio::test]
async fn test_window_caps_range() {
  let ledger = ledger();
  ledger.set_height(500);
  ledger.create_task(MemoryLedger::open_task(1, "a"), 150);
  ledger.create_task(MemoryLedger::open_task(2, "b"), 300);

  let monitor = monitor(100, 75);
  let mut watermark = Watermark::at(100);

  let first = monitor.poll(&ledger, &mut watermark).await.unwrap();
  assert_eq!(first.len(), 1);
  assert_eq!(watermark.height(), Some(200));

  let second = monitor.poll(&ledger, &mut watermark).await.unwrap();
  assert!(second.is_empty());
  assert_eq!(watermark.height(), Some(300));
}

#[tokio::test]
async fn test_empty_range_still_advances() {
  let ledger = ledger();
  ledger.set_height(40);

  let mut watermark = Watermark::at(10);
  let events = monitor(75, 75).poll(&ledger, &mut watermark).await.unwrap();

  assert!(events.is_empty());
  assert_eq!(watermark.height(), Some(40));
}

#[tokio::test]
async fn test_failed_read_leaves_watermark() {
  let ledger = ledger();
  ledger.set_height(200);
  ledger.create_task(MemoryLedger::open_task(5, "x"), 150);
  let monitor = monitor(75, 75);
  let mut watermark = Watermark::at(120);

  ledger.fail_next_reads(1);
  assert!(monitor.poll(&ledger, &mut watermark).await.is_err());
  assert_eq!(watermark.height(), Some(120));

  let events = monitor.poll(&ledger, &mut watermark).await.unwrap();
  assert_eq!(events[0].task_id, 5);
  assert_eq!(watermark.height(), Some(195));
}

#[tokio::test]
async fn test_caught_up_is_a_no_op() {
  let ledger = ledger();
  ledger.set_height(60);

  let mut watermark = Watermark::at(60);
  let events = monitor(75, 75).poll(&ledger, &mut watermark).await.unwrap();

  assert!(events.is_empty());
  assert_eq!(watermark.height(), Some(60));
}

#[tokio::test]
async fn test_events_delivered_once() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(1, "x"), 10);
  let monitor = monitor(75, 75);
  let mut watermark = Watermark::at(0);

  let mut seen = Vec::new();
  for height in [10, 10, 30, 30] {
    ledger.set_height(height);
    seen.extend(monitor.poll(&ledger, &mut watermark).await.unwrap());
  }

  assert_eq!(seen.len(), 1);
}
