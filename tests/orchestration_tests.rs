//! End-to-end pipeline scenarios driven through the orchestrator with a
//! scripted middleware client and comparator.

use flow_regress::config::RegressionConfig;
use flow_regress::runner::CaseOrchestrator;
use flow_regress::testing::mocks::{test_helpers, MockComparator, MockMiddlewareClient};
use flow_regress::types::{CaseOutcome, CaseStage, CompareVerdict, MessageStatus};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

fn seed_files(root: &Path, suffix: &str, names: &[&str]) {
    let dir = root.join(suffix);
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), format!("<Payload name=\"{}\"/>", name)).unwrap();
    }
}

fn orchestrator(
    root: &Path,
    flows: Vec<flow_regress::FlowDescriptor>,
    cases: Vec<flow_regress::CaseDefinition>,
    client: MockMiddlewareClient,
    comparator: MockComparator,
) -> CaseOrchestrator<MockMiddlewareClient, MockComparator> {
    let config =
        RegressionConfig::from_parts(test_helpers::run_config(root), flows, cases).unwrap();
    CaseOrchestrator::new(config, client, comparator).unwrap()
}

#[tokio::test]
async fn flow_to_file_injects_only_the_source_side() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let mut case = test_helpers::case_flow_to_file("OrderFlow");
    case.xpath_exceptions = vec!["/Order/Header/Timestamp".to_string()];
    seed_files(root, &case.source_path_in, &["a.xml", "b.xml", "c.xml"]);
    seed_files(root, &case.target_path_out, &["exp_a.xml", "exp_b.xml", "exp_c.xml"]);

    let client = MockMiddlewareClient::new();
    let comparator = MockComparator::new();
    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        client.clone(),
        comparator.clone(),
    );

    let processed = orchestrator.run().await;
    assert_eq!(processed.len(), 1);

    let messages = match &processed[0].outcome {
        CaseOutcome::Completed(messages) => messages,
        CaseOutcome::Failed(failure) => panic!("case failed: {}", failure.message),
    };
    assert_eq!(messages.len(), 3);

    // Source side only: three injections, each with a fresh unique id and no queue id.
    let injections = client.injections();
    assert_eq!(injections.len(), 3);
    let ids: HashSet<_> = injections.iter().map(|i| i.message_id.clone()).collect();
    assert_eq!(ids.len(), 3);
    assert!(injections.iter().all(|i| i.queue_id.is_none()));

    // Target correlation id is the expected file's literal name; no target injection.
    let target_ids: Vec<_> = messages
        .iter()
        .map(|m| m.extracted.injected.target_id.clone())
        .collect();
    assert_eq!(target_ids, vec!["exp_a.xml", "exp_b.xml", "exp_c.xml"]);
    assert!(messages.iter().all(|m| !m.extracted.injected.target_injected));

    // One status lookup per injected source message.
    for injection in &injections {
        assert_eq!(client.lookup_count(&injection.message_id), 1);
    }

    // Extracted source payloads were persisted, targets point at the expected files.
    for message in messages {
        assert!(message.extracted.source_output.exists());
        assert!(message.extracted.target_output.exists());
        assert_eq!(
            std::fs::read(&message.extracted.source_output).unwrap(),
            b"<Payload/>"
        );
    }

    // Comparator saw all three pairs and the case's path exceptions.
    let calls = comparator.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls
        .iter()
        .all(|c| c.xpath_exceptions == vec!["/Order/Header/Timestamp".to_string()]));
}

#[tokio::test]
async fn file_count_mismatch_fails_before_injection_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let bad = test_helpers::case_flow_to_file("OrderFlow");
    seed_files(root, &bad.source_path_in, &["a.xml", "b.xml", "c.xml"]);
    seed_files(root, &bad.target_path_out, &["exp_a.xml", "exp_b.xml"]);

    let good = test_helpers::case_flow_to_file("InvoiceFlow");
    seed_files(root, &good.source_path_in, &["i.xml"]);
    seed_files(root, &good.target_path_out, &["exp_i.xml"]);

    let client = MockMiddlewareClient::new();
    let orchestrator = orchestrator(
        root,
        vec![
            test_helpers::flow_eo("OrderFlow"),
            test_helpers::flow_eo("InvoiceFlow"),
        ],
        vec![bad, good],
        client.clone(),
        MockComparator::new(),
    );

    let processed = orchestrator.run().await;
    assert_eq!(processed.len(), 2);

    match &processed[0].outcome {
        CaseOutcome::Failed(failure) => {
            assert_eq!(failure.stage, CaseStage::Setup);
            assert!(failure.message.contains('3'));
            assert!(failure.message.contains('2'));
        }
        CaseOutcome::Completed(_) => panic!("mismatched case must fail"),
    }

    // The mismatch was detected before any injection; only the good case injected.
    assert_eq!(client.injections().len(), 1);
    assert!(matches!(processed[1].outcome, CaseOutcome::Completed(_)));
}

#[tokio::test]
async fn eoio_case_shares_one_queue_id_across_all_injections() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case_a = test_helpers::case_flow_to_flow("OrderFlow");
    seed_files(root, &case_a.source_path_in, &["a.xml", "b.xml", "c.xml", "d.xml"]);
    seed_files(root, &case_a.target_path_in, &["e.xml", "f.xml", "g.xml", "h.xml"]);

    let case_b = test_helpers::case_flow_to_flow("InvoiceFlow");
    seed_files(root, &case_b.source_path_in, &["i.xml"]);
    seed_files(root, &case_b.target_path_in, &["j.xml"]);

    let client = MockMiddlewareClient::new();
    let orchestrator = orchestrator(
        root,
        vec![
            test_helpers::flow_eoio("OrderFlow"),
            test_helpers::flow_eoio("InvoiceFlow"),
        ],
        vec![case_a, case_b],
        client.clone(),
        MockComparator::new(),
    );

    let processed = orchestrator.run().await;
    assert!(processed.iter().all(|c| !c.is_failed()));

    let injections = client.injections();
    // 4 files per side for case A (8 injections) plus 1 per side for case B.
    assert_eq!(injections.len(), 10);

    let queue_ids_a: HashSet<_> = injections[..8]
        .iter()
        .map(|i| i.queue_id.clone().unwrap())
        .collect();
    assert_eq!(queue_ids_a.len(), 1, "one queue id per EOIO case");

    let queue_ids_b: HashSet<_> = injections[8..]
        .iter()
        .map(|i| i.queue_id.clone().unwrap())
        .collect();
    assert_eq!(queue_ids_b.len(), 1);
    assert!(queue_ids_a.is_disjoint(&queue_ids_b), "queue ids are per case");

    // Message ids stay globally unique even with a shared queue id.
    let message_ids: HashSet<_> = injections.iter().map(|i| i.message_id.clone()).collect();
    assert_eq!(message_ids.len(), 10);
}

#[tokio::test]
async fn flow_to_flow_extracts_and_persists_both_sides() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case = test_helpers::case_flow_to_flow("OrderFlow");
    seed_files(root, &case.source_path_in, &["a.xml", "b.xml"]);
    seed_files(root, &case.target_path_in, &["x.xml", "y.xml"]);
    let target_out = case.target_path_out.clone();

    let client = MockMiddlewareClient::new();
    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        client.clone(),
        MockComparator::new(),
    );

    let processed = orchestrator.run().await;
    let messages = match &processed[0].outcome {
        CaseOutcome::Completed(messages) => messages,
        CaseOutcome::Failed(failure) => panic!("case failed: {}", failure.message),
    };

    assert_eq!(client.injections().len(), 4);
    assert!(messages.iter().all(|m| m.extracted.injected.target_injected));

    // The target side was extracted with its own correlation id, not the source's.
    for message in messages {
        assert_ne!(
            message.extracted.injected.source_id,
            message.extracted.injected.target_id
        );
        assert_eq!(client.lookup_count(&message.extracted.injected.source_id), 1);
        assert_eq!(client.lookup_count(&message.extracted.injected.target_id), 1);
    }

    // Both payloads were persisted under the case's output directories.
    assert_eq!(root.join(&target_out).read_dir().unwrap().count(), 2);
}

#[tokio::test]
async fn non_success_status_prevents_persistence_and_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case = test_helpers::case_flow_to_file("OrderFlow");
    seed_files(root, &case.source_path_in, &["a.xml"]);
    seed_files(root, &case.target_path_out, &["exp_a.xml"]);
    let source_out = case.source_path_out.clone();

    let client = MockMiddlewareClient::new().with_default_status(MessageStatus::Error);
    let comparator = MockComparator::new();
    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        client,
        comparator.clone(),
    );

    let processed = orchestrator.run().await;
    match &processed[0].outcome {
        CaseOutcome::Failed(failure) => {
            assert_eq!(failure.stage, CaseStage::Extraction);
            assert!(failure.message.contains("SOURCE"));
            assert!(failure.message.contains("error"));
        }
        CaseOutcome::Completed(_) => panic!("case must fail on non-success status"),
    }

    assert_eq!(root.join(&source_out).read_dir().unwrap().count(), 0);
    assert!(comparator.calls().is_empty());
}

#[tokio::test]
async fn injection_failure_is_isolated_to_its_case() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case_a = test_helpers::case_flow_to_file("OrderFlow");
    seed_files(root, &case_a.source_path_in, &["a.xml"]);
    seed_files(root, &case_a.target_path_out, &["exp_a.xml"]);

    let case_b = test_helpers::case_flow_to_file("InvoiceFlow");
    seed_files(root, &case_b.source_path_in, &["i.xml"]);
    seed_files(root, &case_b.target_path_out, &["exp_i.xml"]);

    let client = MockMiddlewareClient::new().with_inject_failure("connection refused");
    let orchestrator = orchestrator(
        root,
        vec![
            test_helpers::flow_eo("OrderFlow"),
            test_helpers::flow_eo("InvoiceFlow"),
        ],
        vec![case_a, case_b],
        client,
        MockComparator::new(),
    );

    let processed = orchestrator.run().await;
    assert_eq!(processed.len(), 2, "every case appears in the result list");
    for case in &processed {
        match &case.outcome {
            CaseOutcome::Failed(failure) => {
                assert_eq!(failure.stage, CaseStage::Injection);
                assert!(failure.message.contains("connection refused"));
            }
            CaseOutcome::Completed(_) => panic!("injection failures must fail the case"),
        }
    }
}

#[tokio::test]
async fn mismatch_verdict_completes_the_case_but_does_not_pass() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case = test_helpers::case_flow_to_file("OrderFlow");
    seed_files(root, &case.source_path_in, &["a.xml", "b.xml"]);
    seed_files(root, &case.target_path_out, &["exp_a.xml", "exp_b.xml"]);

    let comparator = MockComparator::new().with_verdict(
        "a.xml",
        CompareVerdict::Different {
            differences: vec!["value mismatch at /Order/Total".to_string()],
        },
    );
    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        MockMiddlewareClient::new(),
        comparator,
    );

    let processed = orchestrator.run().await;
    let case = &processed[0];
    assert!(!case.is_failed(), "a mismatch is a completed case, not a failure");
    assert!(!case.is_passed());

    match &case.outcome {
        CaseOutcome::Completed(messages) => {
            let verdicts: Vec<_> = messages.iter().map(|m| m.verdict.is_identical()).collect();
            assert_eq!(verdicts, vec![false, true]);
        }
        CaseOutcome::Failed(_) => unreachable!(),
    }
}

#[tokio::test]
async fn housekeeping_removes_stale_outputs_before_injection() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case = test_helpers::case_flow_to_flow("OrderFlow");
    seed_files(root, &case.source_path_in, &["a.xml"]);
    seed_files(root, &case.target_path_in, &["x.xml"]);
    // Stale artifacts from a previous run.
    seed_files(root, &case.source_path_out, &["stale_src.xml"]);
    seed_files(root, &case.target_path_out, &["stale_tgt.xml"]);
    let (source_out, target_out) = (case.source_path_out.clone(), case.target_path_out.clone());

    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        MockMiddlewareClient::new(),
        MockComparator::new(),
    );
    let processed = orchestrator.run().await;
    assert!(!processed[0].is_failed());

    assert!(!root.join(&source_out).join("stale_src.xml").exists());
    assert!(!root.join(&target_out).join("stale_tgt.xml").exists());
}

#[tokio::test]
async fn interrupted_wait_abandons_the_case_without_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let mut case_a = test_helpers::case_flow_to_file("OrderFlow");
    case_a.wait_before_extract = 30;
    seed_files(root, &case_a.source_path_in, &["a.xml"]);
    seed_files(root, &case_a.target_path_out, &["exp_a.xml"]);

    let case_b = test_helpers::case_flow_to_file("InvoiceFlow");
    seed_files(root, &case_b.source_path_in, &["i.xml"]);
    seed_files(root, &case_b.target_path_out, &["exp_i.xml"]);

    let client = MockMiddlewareClient::new();
    let comparator = MockComparator::new();
    let orchestrator = orchestrator(
        root,
        vec![
            test_helpers::flow_eo("OrderFlow"),
            test_helpers::flow_eo("InvoiceFlow"),
        ],
        vec![case_a, case_b],
        client.clone(),
        comparator.clone(),
    );

    // The interrupt fires during the first case's 30s wait.
    orchestrator.interrupt_handle().notify_one();

    let start = Instant::now();
    let processed = orchestrator.run().await;
    assert!(start.elapsed() < Duration::from_secs(30), "wait was cut short");

    match &processed[0].outcome {
        CaseOutcome::Failed(failure) => {
            assert_eq!(failure.stage, CaseStage::Wait);
            assert!(failure.message.contains("FIRST"));
            assert!(failure.message.contains("LAST"));
        }
        CaseOutcome::Completed(_) => panic!("interrupted case must fail"),
    }

    // Injection had already happened, but extraction never started: the
    // interrupted case's message was never looked up.
    let injections = client.injections();
    assert_eq!(injections.len(), 2);
    assert_eq!(client.lookup_count(&injections[0].message_id), 0);

    // One interrupt fails one case; the next case runs to completion.
    assert!(matches!(processed[1].outcome, CaseOutcome::Completed(_)));
    assert_eq!(client.lookup_count(&injections[1].message_id), 1);
    assert_eq!(comparator.calls().len(), 1);
}

#[tokio::test]
async fn failed_payload_write_fails_the_case_at_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let case = test_helpers::case_flow_to_file("OrderFlow");
    seed_files(root, &case.source_path_in, &["a.xml"]);
    seed_files(root, &case.target_path_out, &["exp_a.xml"]);
    // A directory squatting on the output file path survives housekeeping
    // (only regular files are cleared) and makes the payload write fail.
    std::fs::create_dir_all(root.join(&case.source_path_out).join("a.xml")).unwrap();

    let comparator = MockComparator::new();
    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        MockMiddlewareClient::new(),
        comparator.clone(),
    );

    let processed = orchestrator.run().await;
    match &processed[0].outcome {
        CaseOutcome::Failed(failure) => {
            assert_eq!(failure.stage, CaseStage::Persistence);
            assert!(failure.message.contains("a.xml"));
        }
        CaseOutcome::Completed(_) => panic!("unwritable output must fail the case"),
    }
    assert!(comparator.calls().is_empty());
}

#[tokio::test]
async fn wait_before_extract_delays_the_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let mut case = test_helpers::case_flow_to_file("OrderFlow");
    case.wait_before_extract = 1;
    seed_files(root, &case.source_path_in, &["a.xml"]);
    seed_files(root, &case.target_path_out, &["exp_a.xml"]);

    let orchestrator = orchestrator(
        root,
        vec![test_helpers::flow_eo("OrderFlow")],
        vec![case],
        MockMiddlewareClient::new(),
        MockComparator::new(),
    );

    let start = Instant::now();
    let processed = orchestrator.run().await;
    assert!(!processed[0].is_failed());
    assert!(start.elapsed() >= Duration::from_secs(1));
}
