//! Judge Polling
//!
//! Submit-then-poll helper for an external code-execution service. The
//! service itself is opaque; it only has to hand out a token on submit
//! and answer status queries for it.
//!
//! The result never touches the session directly. It comes back to the
//! driver as a [`Command::LocalResult`] and is processed like any other
//! event.
//!
//! No [`JudgeService`] ships with this crate. The default flow sends
//! `submit_code` to the match server, which runs the code and answers
//! with `code_results`. Embedders with their own execution backend
//! implement the trait and call [`spawn_submission`] with the driver's
//! command sender.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::network::driver::Command;
use crate::network::protocol::CodeResults;

/// Judge errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeError {
    /// The service refused the submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    /// Execution finished with an error.
    #[error("execution failed: {0}")]
    Failed(String),

    /// Still pending after the last poll.
    #[error("execution timed out after {seconds} seconds")]
    TimedOut {
        /// Polling window.
        seconds: u64,
    },
}

/// Where a submission is.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
    /// Waiting for a worker.
    InQueue,
    /// Running.
    Processing,
    /// Done.
    Finished(CodeResults),
    /// Execution failed.
    Failed(String),
}

/// A code-execution service.
pub trait JudgeService: Send + Sync + 'static {
    /// Submit source for a match. Returns a polling token.
    fn submit(&self, source: &str, match_id: &str) -> impl Future<Output = Result<String, JudgeError>> + Send;

    /// Current status of a submission.
    fn status(&self, token: &str) -> impl Future<Output = Result<SubmissionStatus, JudgeError>> + Send;
}

/// Polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between status queries.
    pub interval: Duration,
    /// Status queries before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    /// Total polling window.
    pub fn window(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Polling window in whole seconds, rounded up.
    pub fn window_secs(&self) -> u64 {
        let millis = self.window().as_millis().div_ceil(1000);
        u64::try_from(millis).unwrap_or(u64::MAX)
    }
}

/// Submit `source` and poll until the service answers or the policy runs out.
pub async fn run_submission<J: JudgeService>(
    judge: &J,
    source: &str,
    match_id: &str,
    policy: PollPolicy,
) -> Result<CodeResults, JudgeError> {
    let token = judge.submit(source, match_id).await?;
    debug!("Submitted code for match {} (token {})", match_id, token);

    let mut attempts = 0;
    loop {
        attempts += 1;
        match judge.status(&token).await? {
            SubmissionStatus::Finished(results) => {
                info!("Execution finished: {}/{} passed", results.passed, results.total);
                return Ok(results);
            }
            SubmissionStatus::Failed(message) => return Err(JudgeError::Failed(message)),
            status => {
                if attempts >= policy.max_attempts {
                    warn!("Submission {} still pending after {} polls", token, attempts);
                    return Err(JudgeError::TimedOut {
                        seconds: policy.window_secs(),
                    });
                }
                debug!("Submission {} {:?}, poll {}/{}", token, status, attempts, policy.max_attempts);
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}

/// Run a submission in the background and post the result to the driver.
pub fn spawn_submission<J: JudgeService>(
    judge: Arc<J>,
    source: String,
    match_id: String,
    policy: PollPolicy,
    commands: mpsc::Sender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = run_submission(judge.as_ref(), &source, &match_id, policy).await;
        if commands.send(Command::LocalResult(result)).await.is_err() {
            debug!("Driver gone, dropping execution result for match {}", match_id);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers status queries from a script; the last entry repeats.
    struct ScriptedJudge {
        statuses: Mutex<VecDeque<SubmissionStatus>>,
        polls: Mutex<u32>,
    }

    impl ScriptedJudge {
        fn new(statuses: Vec<SubmissionStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                polls: Mutex::new(0),
            }
        }
    }

    impl JudgeService for ScriptedJudge {
        async fn submit(&self, source: &str, _match_id: &str) -> Result<String, JudgeError> {
            if source.is_empty() {
                return Err(JudgeError::Rejected("empty source".to_string()));
            }
            Ok("tok-1".to_string())
        }

        async fn status(&self, _token: &str) -> Result<SubmissionStatus, JudgeError> {
            *self.polls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.pop_front().unwrap())
            } else {
                Ok(statuses.front().cloned().unwrap_or(SubmissionStatus::Processing))
            }
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy { interval: Duration::from_millis(1), max_attempts: 30 }
    }

    fn results(passed: u32, total: u32) -> CodeResults {
        CodeResults { passed, total, ..Default::default() }
    }

    #[test]
    fn test_default_policy_window() {
        assert_eq!(PollPolicy::default().window(), Duration::from_secs(30));
        assert_eq!(PollPolicy::default().window_secs(), 30);
    }

    #[test]
    fn test_short_window_rounds_up() {
        let policy = PollPolicy { interval: Duration::from_millis(1500), max_attempts: 1 };
        assert_eq!(policy.window_secs(), 2);
        assert_eq!(fast().window_secs(), 1);
    }

    #[test]
    fn test_timeout_message() {
        let err = JudgeError::TimedOut { seconds: 30 };
        assert_eq!(err.to_string(), "execution timed out after 30 seconds");
    }

    #[tokio::test]
    async fn test_finishes_after_pending_polls() {
        let judge = ScriptedJudge::new(vec![
            SubmissionStatus::InQueue,
            SubmissionStatus::Processing,
            SubmissionStatus::Finished(results(3, 5)),
        ]);

        let outcome = run_submission(&judge, "print(1)", "m1", fast()).await;
        assert_eq!(outcome, Ok(results(3, 5)));
        assert_eq!(*judge.polls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let judge = ScriptedJudge::new(vec![SubmissionStatus::Processing]);

        let outcome = run_submission(&judge, "while True: pass", "m1", fast()).await;
        assert_eq!(outcome, Err(JudgeError::TimedOut { seconds: 1 }));
        assert_eq!(outcome.unwrap_err().to_string(), "execution timed out after 1 seconds");
        assert_eq!(*judge.polls.lock().unwrap(), 30);
    }

    #[tokio::test]
    async fn test_failure_and_rejection() {
        let judge = ScriptedJudge::new(vec![SubmissionStatus::Failed("SyntaxError".to_string())]);
        assert_eq!(
            run_submission(&judge, "def", "m1", fast()).await,
            Err(JudgeError::Failed("SyntaxError".to_string()))
        );
        assert!(matches!(
            run_submission(&judge, "", "m1", fast()).await,
            Err(JudgeError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_spawned_result_reaches_driver_queue() {
        let judge = Arc::new(ScriptedJudge::new(vec![SubmissionStatus::Finished(results(5, 5))]));
        let (tx, mut rx) = mpsc::channel(4);

        spawn_submission(judge, "code".to_string(), "m1".to_string(), fast(), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(Command::LocalResult(Ok(r))) => assert_eq!(r.passed, 5),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
