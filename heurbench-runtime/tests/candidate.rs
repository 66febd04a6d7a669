use anyhow::{anyhow, Result};
use heurbench_runtime::{Candidate, CandidateFailure, CandidateInvoker, ReplayCandidate};
use serde_json::{json, Value};
use std::{sync::Arc, thread, time::Duration};

fn echo(arguments: &[Value]) -> Result<Value> {
    Ok(json!({ "received": arguments.len() }))
}

#[test]
fn test_invoke_passes_positional_arguments() {
    let invoker = CandidateInvoker::new(Arc::new(echo));
    let output = invoker.invoke(vec![json!(1), json!([2, 3])]).unwrap();
    assert_eq!(output, json!({ "received": 2 }));

    let timed = CandidateInvoker::new(Arc::new(echo)).with_timeout(Some(Duration::from_secs(5)));
    assert_eq!(timed.invoke(vec![]).unwrap(), json!({ "received": 0 }));
}

#[test]
fn test_raised_error_is_captured() {
    let invoker = CandidateInvoker::new(Arc::new(|_: &[Value]| -> Result<Value> {
        Err(anyhow!("no feasible schedule"))
    }));
    match invoker.invoke(vec![]) {
        Err(CandidateFailure::Raised(message)) => assert!(message.contains("no feasible schedule")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_panic_is_captured() {
    let candidate = Arc::new(|_: &[Value]| -> Result<Value> { panic!("index out of range") });
    for timeout in [None, Some(Duration::from_secs(5))] {
        let invoker = CandidateInvoker::new(candidate.clone()).with_timeout(timeout);
        match invoker.invoke(vec![]) {
            Err(CandidateFailure::Panicked(message)) => {
                assert!(message.contains("index out of range"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}

#[test]
fn test_timeout() {
    let invoker = CandidateInvoker::new(Arc::new(|_: &[Value]| -> Result<Value> {
        thread::sleep(Duration::from_millis(500));
        Ok(json!(null))
    }))
    .with_timeout(Some(Duration::from_millis(20)));
    assert_eq!(
        invoker.invoke(vec![]),
        Err(CandidateFailure::TimedOut {
            limit: Duration::from_millis(20)
        })
    );
}

#[test]
fn test_replay_candidate() {
    let replay = ReplayCandidate::new(vec![json!({"tour": [0]}), json!({"tour": [1]})]);
    assert_eq!(replay.remaining(), 2);
    assert_eq!(replay.call(&[]).unwrap(), json!({"tour": [0]}));
    assert_eq!(replay.call(&[json!(7)]).unwrap(), json!({"tour": [1]}));
    assert_eq!(replay.remaining(), 0);
    assert!(replay.call(&[]).is_err());
}
