mod common;

use tokio::sync::mpsc;
use zentra_engine::{ChannelNotifier, NoopNotifier, Step, TaskOutcome, WorkerEvent};
use zentra_ledger::{Address, ConfirmMode, Ledger, LedgerCall, MemoryLedger, TaskStatus};

use common::{PLACEHOLDER, config, driver_with, ledger, me};

const PASTE_URL: &str = "https://paste.rs/xyz";

#[tokio::test(start_paused = true)]
async fn test_open_task_is_accepted_executed_and_submitted() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(1, "[CATEGORY:research] compare layer 1 chains"), 90);

  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), ChannelNotifier::new(tx));

  let outcomes = driver.tick().await;

  assert_eq!(outcomes.len(), 1);
  assert!(matches!(
    &outcomes[0],
    TaskOutcome::Submitted { task_id: 1, proof_url, .. } if proof_url == PASTE_URL
  ));

  let calls = ledger.calls();
  assert_eq!(calls[0], LedgerCall::Accept { task_id: 1 });
  assert_eq!(
    calls[1],
    LedgerCall::Submit {
      task_id: 1,
      proof_url: PASTE_URL.to_string()
    }
  );

  let task = ledger.task(1).await.unwrap();
  assert_eq!(task.status, TaskStatus::Submitted);
  assert_eq!(task.worker, Some(me()));

  let mut events = Vec::new();
  while let Ok(event) = rx.try_recv() {
    events.push(event);
  }
  assert!(matches!(events[0], WorkerEvent::AcceptSent { task_id: 1, .. }));
  assert!(matches!(&events[1], WorkerEvent::ProofPublished { hosted: true, .. }));
  assert!(matches!(events[2], WorkerEvent::SubmitSent { task_id: 1, .. }));
  assert!(matches!(&events[3], WorkerEvent::Finished(TaskOutcome::Submitted { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_accept_is_never_resent() {
  let ledger = ledger();
  ledger.set_confirm_mode(ConfirmMode::Never);
  ledger.create_task(MemoryLedger::open_task(7, "Write me a haiku"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);

  let first = driver.tick().await;
  assert!(matches!(
    first[0],
    TaskOutcome::Unconfirmed {
      task_id: 7,
      step: Step::Accept,
      ..
    }
  ));
  assert!(driver.parked().contains_key(&7));

  // Later ticks see no new events and the task still open on the ledger.
  for height in [101, 120, 180] {
    ledger.set_height(height);
    assert!(driver.tick().await.is_empty());
  }

  assert_eq!(ledger.accept_calls(7), 1);
  assert!(driver.parked().contains_key(&7));
  assert!(driver.is_processed(7));
}

#[tokio::test(start_paused = true)]
async fn test_parked_accept_resumes_once_it_lands() {
  let ledger = ledger();
  ledger.set_confirm_mode(ConfirmMode::Never);
  ledger.create_task(MemoryLedger::open_task(8, "[CATEGORY:research] x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  driver.tick().await;

  // The accept lands after the poller gave up.
  let mut landed = MemoryLedger::open_task(8, "[CATEGORY:research] x");
  landed.status = TaskStatus::Accepted;
  landed.worker = Some(me());
  ledger.put_task(landed);
  ledger.set_confirm_mode(ConfirmMode::Immediate);

  let outcomes = driver.tick().await;

  assert!(matches!(outcomes[0], TaskOutcome::Submitted { task_id: 8, .. }));
  assert!(driver.parked().is_empty());
  assert_eq!(ledger.accept_calls(8), 1);
}

#[tokio::test(start_paused = true)]
async fn test_parked_accept_taken_by_someone_else() {
  let ledger = ledger();
  ledger.set_confirm_mode(ConfirmMode::Never);
  ledger.create_task(MemoryLedger::open_task(9, "x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  driver.tick().await;

  let mut taken = MemoryLedger::open_task(9, "x");
  taken.status = TaskStatus::Accepted;
  taken.worker = Some(Address::repeat_byte(0x22));
  ledger.put_task(taken);

  let outcomes = driver.tick().await;

  assert!(matches!(outcomes[0], TaskOutcome::Skipped { task_id: 9, .. }));
  assert!(driver.parked().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reverted_accept() {
  let ledger = ledger();
  ledger.set_confirm_mode(ConfirmMode::Revert);
  ledger.create_task(MemoryLedger::open_task(2, "x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  let outcomes = driver.tick().await;

  assert!(matches!(
    outcomes[0],
    TaskOutcome::Reverted {
      task_id: 2,
      step: Step::Accept,
      ..
    }
  ));
  assert_eq!(ledger.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_policy_rejection_sends_nothing() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(3, "Write me a haiku"), 95);

  let config = config(r#", "acceptance": { "policy": "min_confidence", "min_confidence": 0.8 }"#);
  let mut driver = driver_with(ledger.clone(), &config, Some(PASTE_URL), NoopNotifier);

  let outcomes = driver.tick().await;

  assert!(matches!(outcomes[0], TaskOutcome::Rejected { task_id: 3, .. }));
  assert!(ledger.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_placeholder_proof_submitted_by_default() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(4, "x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), None, NoopNotifier);
  let outcomes = driver.tick().await;

  match &outcomes[0] {
    TaskOutcome::Submitted { proof_url, .. } => {
      assert!(proof_url.starts_with(&format!("{}/proof?taskId=4&ts=", PLACEHOLDER)))
    }
    other => panic!("unexpected outcome: {:?}", other),
  }
}

#[tokio::test(start_paused = true)]
async fn test_required_hosting_blocks_placeholder_submit() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(5, "x"), 95);

  let config = config(r#", "proof": { "require_hosted": true }"#);
  let mut driver = driver_with(ledger.clone(), &config, None, NoopNotifier);
  let outcomes = driver.tick().await;

  assert!(matches!(outcomes[0], TaskOutcome::Failed { task_id: 5, .. }));
  assert_eq!(ledger.calls(), vec![LedgerCall::Accept { task_id: 5 }]);
}

#[tokio::test(start_paused = true)]
async fn test_foreign_and_settled_tasks_are_skipped() {
  let ledger = ledger();

  let mut foreign = MemoryLedger::open_task(10, "x");
  foreign.status = TaskStatus::Accepted;
  foreign.worker = Some(Address::repeat_byte(0x22));
  ledger.create_task(foreign, 95);

  let mut done = MemoryLedger::open_task(11, "x");
  done.status = TaskStatus::Completed;
  ledger.create_task(done, 96);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  let outcomes = driver.tick().await;

  assert_eq!(outcomes.len(), 2);
  assert!(outcomes.iter().all(|o| matches!(o, TaskOutcome::Skipped { .. })));
  assert!(ledger.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_accepted_task_resumes_at_execution() {
  let ledger = ledger();
  let mut mine = MemoryLedger::open_task(12, "x");
  mine.status = TaskStatus::Accepted;
  mine.worker = Some(me());
  ledger.create_task(mine, 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  let outcomes = driver.tick().await;

  assert!(matches!(outcomes[0], TaskOutcome::Submitted { task_id: 12, .. }));
  assert_eq!(ledger.accept_calls(12), 0);
}

#[tokio::test(start_paused = true)]
async fn test_task_handled_once() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(13, "x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  driver.tick().await;

  let again = driver.handle_task(13).await;

  assert!(matches!(again, TaskOutcome::Skipped { task_id: 13, .. }));
  assert_eq!(ledger.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_handles_open_tasks() {
  let ledger = ledger();
  // Created far below the look-back window, so only a sweep finds them.
  ledger.put_task(MemoryLedger::open_task(20, "x"));
  ledger.put_task(MemoryLedger::open_task(21, "y"));
  let mut closed = MemoryLedger::open_task(22, "z");
  closed.status = TaskStatus::Cancelled;
  ledger.put_task(closed);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  let outcomes = driver.sweep_open_tasks().await.unwrap();

  let ids: Vec<u64> = outcomes.iter().map(|o| o.task_id()).collect();
  assert_eq!(ids, vec![20, 21]);
  assert!(driver.tick().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sweep_resumes_tasks_accepted_before_restart() {
  let ledger = ledger();
  let mut mine = MemoryLedger::open_task(40, "[CATEGORY:research] x");
  mine.status = TaskStatus::Accepted;
  mine.worker = Some(me());
  ledger.put_task(mine);
  let mut theirs = MemoryLedger::open_task(41, "y");
  theirs.status = TaskStatus::Accepted;
  theirs.worker = Some(Address::repeat_byte(0x22));
  ledger.put_task(theirs);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);
  let outcomes = driver.sweep_open_tasks().await.unwrap();

  assert_eq!(outcomes.len(), 1);
  assert!(matches!(outcomes[0], TaskOutcome::Submitted { task_id: 40, .. }));
  assert_eq!(ledger.accept_calls(40), 0);
  assert_eq!(
    ledger.calls(),
    vec![LedgerCall::Submit {
      task_id: 40,
      proof_url: PASTE_URL.to_string()
    }]
  );
  assert_eq!(ledger.task(40).await.unwrap().status, TaskStatus::Submitted);
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_submit_is_parked_then_settled() {
  let ledger = ledger();
  let mut accepted = MemoryLedger::open_task(50, "[CATEGORY:research] x");
  accepted.status = TaskStatus::Accepted;
  accepted.worker = Some(me());
  ledger.create_task(accepted.clone(), 95);
  ledger.set_confirm_mode(ConfirmMode::Never);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);

  let first = driver.tick().await;
  assert!(matches!(
    first[0],
    TaskOutcome::Unconfirmed {
      task_id: 50,
      step: Step::Submit,
      ..
    }
  ));
  assert_eq!(driver.parked()[&50].step, Step::Submit);

  // Still pending: nothing settles and nothing is re-sent.
  ledger.set_height(101);
  assert!(driver.tick().await.is_empty());

  let mut submitted = accepted;
  submitted.status = TaskStatus::Submitted;
  submitted.proof_url = PASTE_URL.to_string();
  ledger.put_task(submitted);
  ledger.set_height(102);

  let outcomes = driver.tick().await;

  assert_eq!(outcomes.len(), 1);
  assert!(matches!(
    &outcomes[0],
    TaskOutcome::Submitted { task_id: 50, proof_url, .. } if proof_url == PASTE_URL
  ));
  assert!(driver.parked().is_empty());
  let submits = ledger
    .calls()
    .iter()
    .filter(|c| matches!(c, LedgerCall::Submit { task_id: 50, .. }))
    .count();
  assert_eq!(submits, 1);
  assert_eq!(ledger.accept_calls(50), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_scan_is_retried() {
  let ledger = ledger();
  ledger.create_task(MemoryLedger::open_task(30, "x"), 95);

  let mut driver = driver_with(ledger.clone(), &config(""), Some(PASTE_URL), NoopNotifier);

  ledger.fail_next_reads(1);
  assert!(driver.tick().await.is_empty());
  assert_eq!(driver.watermark().height(), None);

  let outcomes = driver.tick().await;
  assert_eq!(outcomes[0].task_id(), 30);
}
