//! Match Session
//!
//! One player's session context: the lifecycle machine, both sides'
//! progress, the countdown and the termination arbiter, plus the
//! outbound channel intents are pushed through.
//!
//! Every input (user intent, inbound server event, local execution
//! result, timer tick) is processed to completion before returning,
//! including the arbiter check. Each handler returns the events it
//! produced so the caller can forward them to the UI.

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::core::progress::{Progress, ProgressReconciler, ProgressSnapshot, Side};
use crate::core::timer::{Countdown, TickOutcome};
use crate::game::arbiter::{ArbiterInput, EndReason, TerminationArbiter};
use crate::game::events::{ErrorKind, ErrorSignal, SessionEvent};
use crate::game::machine::{MatchStateMachine, Transition, TransitionError, Trigger};
use crate::game::outcome::{MatchResult, Outcome};
use crate::game::state::{AlgorithmType, Match, MatchState, Player};
use crate::network::connection::{ChannelEvent, Outbound};
use crate::network::judge::JudgeError;
use crate::network::protocol::{
    ClientMessage, CodeResults, CodeSubmission, JoinQueueRequest, LeaveQueueRequest,
    MatchEndInfo, MatchFoundInfo, ServerMessage,
};
use crate::network::transport::ConnectionError;

/// Session errors. Returned for user intents only; inbound events never fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Intent not valid in the current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Intent could not be queued.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// No running match to act on.
    #[error("game session not initialized")]
    NotInGame,
}

impl SessionError {
    /// Map to a transient error signal for the UI.
    pub fn to_signal(&self) -> ErrorSignal {
        let kind = match self {
            SessionError::Connection(_) => ErrorKind::Connection,
            SessionError::Transition(_) | SessionError::NotInGame => ErrorKind::Rejected,
        };
        ErrorSignal::new(kind, self.to_string())
    }
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown start value in seconds.
    pub match_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { match_seconds: 1800 }
    }
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lifecycle state.
    pub state: MatchState,
    /// No match record yet; show a loading view.
    pub loading: bool,
    /// Current match id.
    pub match_id: Option<String>,
    /// Current opponent.
    pub opponent: Option<Player>,
    /// Both sides' progress.
    pub progress: ProgressSnapshot,
    /// Seconds left.
    pub time_remaining: u32,
    /// Frozen result once Ended.
    pub result: Option<MatchResult>,
}

/// A player's session.
pub struct MatchSession<O: Outbound> {
    identity: Player,
    outbound: O,
    machine: MatchStateMachine,
    progress: ProgressReconciler,
    countdown: Countdown,
    arbiter: TerminationArbiter,
    result: Option<MatchResult>,
}

impl<O: Outbound> MatchSession<O> {
    /// Create an Idle session for `identity`, sending intents through `outbound`.
    pub fn new(identity: Player, outbound: O, config: SessionConfig) -> Self {
        Self {
            identity,
            outbound,
            machine: MatchStateMachine::new(),
            progress: ProgressReconciler::new(),
            countdown: Countdown::new(config.match_seconds),
            arbiter: TerminationArbiter::new(),
            result: None,
        }
    }

    // =========================================================================
    // USER INTENTS
    // =========================================================================

    /// Idle → Queuing, sending `join_queue`.
    ///
    /// Nothing changes if the intent cannot be queued.
    pub fn join_queue(&mut self, algorithm: AlgorithmType) -> Result<Vec<SessionEvent>, SessionError> {
        self.machine.permits(Trigger::JoinQueue)?;
        self.outbound.send(ClientMessage::JoinQueue(JoinQueueRequest {
            player_id: self.identity.id.clone(),
            player_name: self.identity.name.clone(),
            algorithm_type: algorithm,
        }))?;

        let transition = self.machine.join_queue()?;
        info!("{} joined the {:?} queue", self.identity.name, algorithm);
        Ok(vec![state_changed(transition)])
    }

    /// Queuing → Idle, sending `leave_queue`.
    ///
    /// Leaving always succeeds locally; a send failure is reported as a
    /// transient error alongside the transition.
    pub fn cancel_queue(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        self.machine.permits(Trigger::CancelQueue)?;

        let mut events = Vec::new();
        if let Err(e) = self.outbound.send(ClientMessage::LeaveQueue(LeaveQueueRequest {
            player_id: self.identity.id.clone(),
        })) {
            warn!("leave_queue not delivered: {}", e);
            events.push(SessionEvent::Error(ErrorSignal::new(ErrorKind::Connection, e.to_string())));
        }

        let transition = self.machine.cancel_queue()?;
        events.insert(0, state_changed(transition));
        Ok(events)
    }

    /// Send code for server-side execution. Results arrive as `code_results`.
    pub fn submit_code(&mut self, code: impl Into<String>) -> Result<Vec<SessionEvent>, SessionError> {
        let match_id = self.running_match_id().ok_or(SessionError::NotInGame)?;
        self.outbound.send(ClientMessage::SubmitCode(CodeSubmission {
            code: code.into(),
            match_id,
            player_id: self.identity.id.clone(),
        }))?;
        debug!("Code submitted");
        Ok(Vec::new())
    }

    /// Ended → Idle, clearing the match, progress and countdown.
    pub fn new_session(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let transition = self.machine.new_session()?;
        self.progress.clear();
        self.countdown.clear();
        self.result = None;
        Ok(vec![state_changed(transition)])
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Process one channel event.
    pub fn handle_channel_event(&mut self, event: ChannelEvent) -> Vec<SessionEvent> {
        match event {
            ChannelEvent::Message(message) => self.handle_server_message(message),
            ChannelEvent::Connected => {
                debug!("Channel connected");
                Vec::new()
            }
            ChannelEvent::Reconnecting { attempt } => {
                debug!("Channel reconnecting (attempt {})", attempt);
                Vec::new()
            }
            ChannelEvent::Disconnected { reason } => {
                vec![SessionEvent::Error(ErrorSignal::new(
                    ErrorKind::Connection,
                    format!("connection lost: {}", reason),
                ))]
            }
            ChannelEvent::Failed { attempts } => {
                warn!("Match server unreachable, session state kept ({})", self.machine.state());
                vec![SessionEvent::Error(ErrorSignal::new(
                    ErrorKind::Connection,
                    format!("could not reach match server after {} attempts", attempts),
                ))]
            }
        }
    }

    /// Process one server event.
    pub fn handle_server_message(&mut self, message: ServerMessage) -> Vec<SessionEvent> {
        match message {
            ServerMessage::ConnectionEstablished { sid } => {
                info!("Connection established (sid {})", sid);
                Vec::new()
            }
            ServerMessage::QueueLeft { message } => {
                info!("Queue left: {}", message);
                Vec::new()
            }
            ServerMessage::MatchFound(info) => self.on_match_found(info),
            ServerMessage::OpponentProgress(report) => self.on_progress(Side::Opponent, report.into()),
            ServerMessage::CodeResults(results) => self.on_code_results(results),
            ServerMessage::MatchEnded(info) => self.on_match_ended(info),
            ServerMessage::Error(error) => {
                warn!("Server error: {}", error.message);
                vec![SessionEvent::Error(ErrorSignal::new(ErrorKind::Server, error.message))]
            }
        }
    }

    /// Process the outcome of a local execution.
    pub fn handle_local_result(&mut self, result: Result<CodeResults, JudgeError>) -> Vec<SessionEvent> {
        match result {
            Ok(results) => self.on_code_results(results),
            Err(e) => {
                warn!("Execution failed: {}", e);
                vec![SessionEvent::Error(ErrorSignal::new(ErrorKind::Execution, e.to_string()))]
            }
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if self.machine.state() != MatchState::InGame {
            return Vec::new();
        }

        let remaining = match self.countdown.tick() {
            TickOutcome::Idle => return Vec::new(),
            TickOutcome::Ticked { remaining } => remaining,
            TickOutcome::Expired => 0,
        };
        self.machine.set_time_remaining(remaining);

        let mut events = vec![SessionEvent::TimerTicked { remaining }];
        self.arbitrate(&mut events);
        events
    }

    fn on_match_found(&mut self, info: MatchFoundInfo) -> Vec<SessionEvent> {
        if self.machine.state() != MatchState::Queuing {
            warn!("match_found {} ignored while {}", info.match_id, self.machine.state());
            return Vec::new();
        }

        let total_tests = if info.total_tests > 0 {
            info.total_tests
        } else {
            info.question.test_count()
        };

        self.countdown.start();
        let found = Match {
            match_id: info.match_id,
            question: info.question,
            opponent: info.opponent,
            total_tests,
            time_remaining: self.countdown.remaining(),
        };
        let started = SessionEvent::MatchStarted {
            match_id: found.match_id.clone(),
            opponent: found.opponent.clone(),
            total_tests,
            time_remaining: found.time_remaining,
        };

        let transition = match self.machine.match_found(found) {
            Ok(t) => t,
            Err(e) => {
                warn!("match_found rejected: {}", e);
                self.countdown.clear();
                return Vec::new();
            }
        };
        self.progress.reset(total_tests);
        self.result = None;

        let mut events = vec![state_changed(transition), started];
        self.arbitrate(&mut events);
        events
    }

    fn on_code_results(&mut self, results: CodeResults) -> Vec<SessionEvent> {
        if self.machine.state() != MatchState::InGame {
            debug!("code_results ignored while {}", self.machine.state());
            return Vec::new();
        }

        let update = self.progress.apply(Side::Me, results.progress());
        let mut events = vec![SessionEvent::Progress(update), SessionEvent::ExecutionFinished(results)];
        self.arbitrate(&mut events);
        events
    }

    fn on_progress(&mut self, side: Side, report: Progress) -> Vec<SessionEvent> {
        if self.machine.state() != MatchState::InGame {
            debug!("{:?} progress ignored while {}", side, self.machine.state());
            return Vec::new();
        }

        let mut events = vec![SessionEvent::Progress(self.progress.apply(side, report))];
        self.arbitrate(&mut events);
        events
    }

    fn on_match_ended(&mut self, info: MatchEndInfo) -> Vec<SessionEvent> {
        match &info.winner_id {
            Some(winner) => info!("Server ended match, winner {}", winner),
            None => info!("Server ended match without a winner"),
        }

        let mut events = Vec::new();
        self.finish(EndReason::ServerEnded, &mut events);
        events
    }

    // =========================================================================
    // TERMINATION
    // =========================================================================

    fn arbitrate(&mut self, events: &mut Vec<SessionEvent>) {
        let input = ArbiterInput {
            state: self.machine.state(),
            progress: self.progress.snapshot(),
            time_remaining: self.countdown.remaining(),
        };
        if let Some(reason) = self.arbiter.evaluate(&input) {
            self.finish(reason, events);
        }
    }

    /// Enter Ended once, freezing progress and the countdown.
    fn finish(&mut self, reason: EndReason, events: &mut Vec<SessionEvent>) {
        let Some(transition) = self.machine.end() else {
            return;
        };

        self.countdown.freeze();
        let time_remaining = self.countdown.remaining();
        self.machine.set_time_remaining(time_remaining);

        let frozen = self.progress.snapshot();
        let result = MatchResult {
            outcome: Outcome::decide(frozen.me.current, frozen.opponent.current),
            reason,
            my_progress: frozen.me.current,
            opponent_progress: frozen.opponent.current,
            time_remaining,
        };
        info!(
            "Match over ({:?}): {} {} vs {}",
            reason,
            result.outcome.headline(),
            result.my_progress,
            result.opponent_progress
        );

        self.result = Some(result);
        events.push(state_changed(transition));
        events.push(SessionEvent::MatchEnded(result));
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Lifecycle state.
    pub fn state(&self) -> MatchState {
        self.machine.state()
    }

    /// Local player.
    pub fn identity(&self) -> &Player {
        &self.identity
    }

    /// Current match.
    pub fn current_match(&self) -> Option<&Match> {
        self.machine.current_match()
    }

    /// Frozen result, once Ended.
    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    /// Seconds left.
    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Outbound channel, mutably (initialize / teardown).
    pub fn outbound_mut(&mut self) -> &mut O {
        &mut self.outbound
    }

    /// Rendering view.
    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.machine.current_match();
        SessionSnapshot {
            state: self.machine.state(),
            loading: current.is_none(),
            match_id: current.map(|m| m.match_id.clone()),
            opponent: current.map(|m| m.opponent.clone()),
            progress: self.progress.snapshot(),
            time_remaining: self.countdown.remaining(),
            result: self.result,
        }
    }

    fn running_match_id(&self) -> Option<String> {
        if self.machine.state() != MatchState::InGame {
            return None;
        }
        self.machine.current_match().map(|m| m.match_id.clone())
    }
}

fn state_changed(transition: Transition) -> SessionEvent {
    SessionEvent::StateChanged {
        from: transition.from,
        to: transition.to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::game::state::{Question, QuestionType};
    use crate::network::protocol::{ProgressReport, ServerError};

    /// Records intents; can be switched to refuse them.
    #[derive(Clone, Default)]
    struct RecordingOutbound {
        sent: Arc<Mutex<Vec<ClientMessage>>>,
        offline: Arc<Mutex<bool>>,
    }

    impl RecordingOutbound {
        fn events(&self) -> Vec<&'static str> {
            self.sent.lock().unwrap().iter().map(|m| m.event_name()).collect()
        }

        fn go_offline(&self) {
            *self.offline.lock().unwrap() = true;
        }
    }

    impl Outbound for RecordingOutbound {
        fn send(&self, message: ClientMessage) -> Result<(), ConnectionError> {
            if *self.offline.lock().unwrap() {
                return Err(ConnectionError::NotConnected);
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn session(seconds: u32) -> (MatchSession<RecordingOutbound>, RecordingOutbound) {
        let outbound = RecordingOutbound::default();
        let session = MatchSession::new(
            Player::new("user_1", "Alice"),
            outbound.clone(),
            SessionConfig { match_seconds: seconds },
        );
        (session, outbound)
    }

    fn found(total_tests: u32) -> ServerMessage {
        ServerMessage::MatchFound(MatchFoundInfo {
            match_id: "m1".to_string(),
            opponent: Player::new("user_2", "Bob"),
            question: Question {
                id: Some("q1".to_string()),
                title: "Two Sum".to_string(),
                description: String::new(),
                test_cases: Vec::new(),
                question_type: QuestionType::Array,
            },
            total_tests,
        })
    }

    fn in_game(seconds: u32, total_tests: u32) -> (MatchSession<RecordingOutbound>, RecordingOutbound) {
        let (mut s, out) = session(seconds);
        s.join_queue(AlgorithmType::Random).unwrap();
        s.handle_server_message(found(total_tests));
        assert_eq!(s.state(), MatchState::InGame);
        (s, out)
    }

    fn opponent(passed: u32, total: u32) -> ServerMessage {
        ServerMessage::OpponentProgress(ProgressReport { tests_passed: passed, total_tests: total })
    }

    fn mine(passed: u32, total: u32) -> ServerMessage {
        ServerMessage::CodeResults(CodeResults { passed, total, ..Default::default() })
    }

    fn ended(events: &[SessionEvent]) -> Option<MatchResult> {
        events.iter().find_map(|e| match e {
            SessionEvent::MatchEnded(r) => Some(*r),
            _ => None,
        })
    }

    #[test]
    fn test_join_and_cancel_send_intents() {
        let (mut s, out) = session(60);

        let events = s.join_queue(AlgorithmType::Graph).unwrap();
        assert_eq!(events, vec![SessionEvent::StateChanged { from: MatchState::Idle, to: MatchState::Queuing }]);

        s.cancel_queue().unwrap();
        assert_eq!(s.state(), MatchState::Idle);
        assert_eq!(out.events(), vec!["join_queue", "leave_queue"]);
    }

    #[test]
    fn test_join_offline_keeps_state() {
        let (mut s, out) = session(60);
        out.go_offline();

        let err = s.join_queue(AlgorithmType::Tree).unwrap_err();
        assert_eq!(err, SessionError::Connection(ConnectionError::NotConnected));
        assert_eq!(err.to_signal().kind, ErrorKind::Connection);
        assert_eq!(s.state(), MatchState::Idle);
    }

    #[test]
    fn test_cancel_offline_still_leaves() {
        let (mut s, out) = session(60);
        s.join_queue(AlgorithmType::Tree).unwrap();
        out.go_offline();

        let events = s.cancel_queue().unwrap();
        assert_eq!(s.state(), MatchState::Idle);
        assert!(matches!(events[1], SessionEvent::Error(ErrorSignal { kind: ErrorKind::Connection, .. })));
    }

    #[test]
    fn test_invalid_intents_rejected() {
        let (mut s, out) = session(60);
        assert!(matches!(s.cancel_queue(), Err(SessionError::Transition(_))));
        assert!(matches!(s.new_session(), Err(SessionError::Transition(_))));
        assert_eq!(s.submit_code("x"), Err(SessionError::NotInGame));
        assert!(out.events().is_empty());
        assert_eq!(SessionError::NotInGame.to_signal().kind, ErrorKind::Rejected);
    }

    #[test]
    fn test_match_found_starts_game() {
        let (mut s, _) = session(90);
        s.join_queue(AlgorithmType::Array).unwrap();

        let events = s.handle_server_message(found(5));
        assert_eq!(events[0], SessionEvent::StateChanged { from: MatchState::Queuing, to: MatchState::InGame });
        assert!(matches!(
            &events[1],
            SessionEvent::MatchStarted { total_tests: 5, time_remaining: 90, .. }
        ));

        let snap = s.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.opponent.unwrap().name, "Bob");
        assert_eq!(snap.progress.me.current, Progress::new(0, 5));
        assert_eq!(snap.progress.opponent.current, Progress::new(0, 5));
    }

    #[test]
    fn test_match_found_outside_queue_ignored() {
        let (mut s, _) = session(60);
        assert!(s.handle_server_message(found(5)).is_empty());
        assert_eq!(s.state(), MatchState::Idle);
        assert!(s.snapshot().loading);
    }

    #[test]
    fn test_local_completion_wins_immediately() {
        let (mut s, _) = in_game(60, 5);
        for _ in 0..18 {
            s.tick();
        }
        assert_eq!(s.time_remaining(), 42);
        s.handle_server_message(opponent(2, 5));

        let events = s.handle_server_message(mine(5, 5));
        let result = ended(&events).expect("match should end");

        assert_eq!(s.state(), MatchState::Ended);
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(result.reason, EndReason::AllTestsPassed(Side::Me));
        assert_eq!(result.time_remaining, 42);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::ExecutionFinished(_))));
    }

    #[test]
    fn test_opponent_completion_loses() {
        let (mut s, _) = in_game(60, 5);
        s.handle_server_message(mine(3, 5));
        let result = ended(&s.handle_server_message(opponent(5, 5))).unwrap();
        assert_eq!(result.outcome, Outcome::Loss);
        assert_eq!(result.reason, EndReason::AllTestsPassed(Side::Opponent));
    }

    #[test]
    fn test_timer_expiry_ends_on_zero_tick() {
        let (mut s, _) = in_game(10, 5);
        s.handle_server_message(mine(3, 5));
        s.handle_server_message(opponent(2, 5));

        for expected in (1..10).rev() {
            let events = s.tick();
            assert_eq!(events, vec![SessionEvent::TimerTicked { remaining: expected }]);
        }

        let events = s.tick();
        let result = ended(&events).unwrap();
        assert_eq!(result.reason, EndReason::TimeExpired);
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(result.my_progress, Progress::new(3, 5));
        assert_eq!(result.time_remaining, 0);
        assert_eq!(s.current_match().unwrap().time_remaining, 0);

        assert!(s.tick().is_empty());
        assert_eq!(s.time_remaining(), 0);
    }

    #[test]
    fn test_out_of_order_opponent_progress() {
        let (mut s, _) = in_game(60, 10);
        s.handle_server_message(opponent(4, 10));
        let events = s.handle_server_message(opponent(2, 10));

        match &events[0] {
            SessionEvent::Progress(update) => {
                assert_eq!(update.current, Progress::new(2, 10));
                assert_eq!(update.displayed, 40);
                assert!(update.regressed);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(s.snapshot().progress.opponent.displayed(), 40);
    }

    #[test]
    fn test_end_happens_once() {
        let (mut s, _) = in_game(60, 5);
        let first = s.handle_server_message(mine(5, 5));
        assert!(ended(&first).is_some());
        let frozen = *s.result().unwrap();

        assert!(s.handle_server_message(ServerMessage::MatchEnded(MatchEndInfo::default())).is_empty());
        assert!(s.handle_server_message(opponent(5, 5)).is_empty());
        assert!(s.handle_server_message(mine(1, 5)).is_empty());
        assert!(s.tick().is_empty());

        assert_eq!(s.state(), MatchState::Ended);
        assert_eq!(*s.result().unwrap(), frozen);
        assert_eq!(s.snapshot().progress.me.current, Progress::new(5, 5));
    }

    #[test]
    fn test_server_end_overrides() {
        let (mut s, _) = in_game(60, 10);
        s.handle_server_message(mine(7, 10));
        s.handle_server_message(opponent(7, 10));

        let result = ended(&s.handle_server_message(ServerMessage::MatchEnded(MatchEndInfo::default()))).unwrap();
        assert_eq!(result.reason, EndReason::ServerEnded);
        assert_eq!(result.outcome, Outcome::Tie);
    }

    #[test]
    fn test_errors_do_not_change_state() {
        let (mut s, _) = in_game(60, 5);
        let before = s.snapshot();

        let events = s.handle_server_message(ServerMessage::Error(ServerError {
            message: "Code execution error".to_string(),
        }));
        assert!(matches!(events[0], SessionEvent::Error(ErrorSignal { kind: ErrorKind::Server, .. })));

        let events = s.handle_local_result(Err(JudgeError::TimedOut { seconds: 30 }));
        match &events[0] {
            SessionEvent::Error(signal) => {
                assert_eq!(signal.kind, ErrorKind::Execution);
                assert_eq!(signal.message, "execution timed out after 30 seconds");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        s.handle_channel_event(ChannelEvent::Failed { attempts: 5 });
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_local_result_counts_as_own_progress() {
        let (mut s, _) = in_game(60, 4);
        let events = s.handle_local_result(Ok(CodeResults { passed: 2, total: 4, ..Default::default() }));
        assert!(matches!(events[0], SessionEvent::Progress(u) if u.side == Side::Me && u.displayed == 50));
    }

    #[test]
    fn test_submit_code_carries_match_id() {
        let (mut s, out) = in_game(60, 5);
        s.submit_code("def f(): pass").unwrap();

        let sent = out.sent.lock().unwrap();
        match sent.last() {
            Some(ClientMessage::SubmitCode(sub)) => {
                assert_eq!(sub.match_id, "m1");
                assert_eq!(sub.player_id, "user_1");
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[test]
    fn test_new_session_clears_everything() {
        let (mut s, _) = in_game(30, 5);
        s.tick();
        s.handle_server_message(mine(5, 5));

        let events = s.new_session().unwrap();
        assert_eq!(events, vec![SessionEvent::StateChanged { from: MatchState::Ended, to: MatchState::Idle }]);

        let snap = s.snapshot();
        assert_eq!(snap.state, MatchState::Idle);
        assert!(snap.loading);
        assert!(snap.result.is_none());
        assert_eq!(snap.time_remaining, 30);
        assert_eq!(snap.progress, ProgressSnapshot::default());

        // Next match starts fresh
        s.join_queue(AlgorithmType::Random).unwrap();
        s.handle_server_message(found(3));
        assert_eq!(s.snapshot().progress.me.displayed(), 0);
    }

    #[test]
    fn test_zero_test_match_never_completes() {
        let (mut s, _) = in_game(60, 0);
        assert!(ended(&s.handle_server_message(mine(0, 0))).is_none());
        assert_eq!(s.state(), MatchState::InGame);
    }
}
