// Per-connection protocol state machine for the textual binding
use crate::error::{FrameError, ParseError};
use crate::expr::evaluate;
use crate::text::{decode_request, TextRequest, TextResponse};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Greeted,
    Closed,
}

/// Why a connection is being terminated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("request before HELLO")]
    NotGreeted,

    #[error("HELLO on an established connection")]
    RepeatedGreeting,

    #[error("undecodable frame: {0}")]
    Malformed(#[from] FrameError),

    #[error("expression rejected: {0}")]
    Evaluation(#[from] ParseError),

    #[error("connection already closed")]
    Closed,
}

/// What the dispatcher must do with the connection after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the response and keep the connection.
    Reply(TextResponse),
    /// Send `BYE` and close the connection.
    Terminate(Violation),
}

impl Action {
    /// Response to put on the wire for this action.
    pub fn response(&self) -> TextResponse {
        match self {
            Action::Reply(response) => *response,
            Action::Terminate(_) => TextResponse::Bye,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Init,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_greeted(&self) -> bool {
        self.state == SessionState::Greeted
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Feed one complete frame. Any `Terminate` moves the session to `Closed`.
    pub fn handle_frame(&mut self, frame: &[u8]) -> Action {
        let action = match self.state {
            SessionState::Closed => Action::Terminate(Violation::Closed),
            state => match (state, decode_request(frame)) {
                (_, Err(e)) => Action::Terminate(e.into()),
                (SessionState::Init, Ok(TextRequest::Hello)) => {
                    self.state = SessionState::Greeted;
                    Action::Reply(TextResponse::Hello)
                }
                (SessionState::Init, Ok(TextRequest::Solve(_))) => {
                    Action::Terminate(Violation::NotGreeted)
                }
                (_, Ok(TextRequest::Hello)) => Action::Terminate(Violation::RepeatedGreeting),
                (_, Ok(TextRequest::Solve(expression))) => match evaluate(&expression) {
                    Ok(value) => Action::Reply(TextResponse::result(value)),
                    Err(e) => Action::Terminate(e.into()),
                },
            },
        };

        if let Action::Terminate(_) = action {
            self.state = SessionState::Closed;
        }
        action
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeted() -> Session {
        let mut session = Session::new();
        assert_eq!(session.handle_frame(b"HELLO\n"), Action::Reply(TextResponse::Hello));
        session
    }

    #[test]
    fn starts_ungreeted() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Init);
        assert!(!session.is_greeted());
    }

    #[test]
    fn hello_then_solve() {
        let mut session = greeted();
        assert!(session.is_greeted());
        assert_eq!(
            session.handle_frame(b"SOLVE (+ 1 2)\n"),
            Action::Reply(TextResponse::Result(3))
        );
        assert_eq!(
            session.handle_frame(b"SOLVE (* 2 3 4)\n"),
            Action::Reply(TextResponse::Result(24))
        );
        assert_eq!(session.state(), SessionState::Greeted);
    }

    #[test]
    fn solve_before_hello_terminates() {
        let mut session = Session::new();
        let action = session.handle_frame(b"SOLVE (+ 1 2)\n");
        assert_eq!(action, Action::Terminate(Violation::NotGreeted));
        assert_eq!(action.response(), TextResponse::Bye);
        assert!(session.is_closed());
    }

    #[test]
    fn failed_evaluation_terminates() {
        let mut session = greeted();
        assert_eq!(
            session.handle_frame(b"SOLVE (/ 4 0)\n"),
            Action::Terminate(Violation::Evaluation(ParseError::DivisionByZero))
        );
        assert!(session.is_closed());
    }

    #[test]
    fn second_hello_terminates() {
        let mut session = greeted();
        assert_eq!(
            session.handle_frame(b"HELLO\n"),
            Action::Terminate(Violation::RepeatedGreeting)
        );
    }

    #[test]
    fn malformed_frame_terminates_in_any_state() {
        let mut fresh = Session::new();
        assert!(matches!(
            fresh.handle_frame(b"HI\n"),
            Action::Terminate(Violation::Malformed(_))
        ));

        let mut established = greeted();
        assert!(matches!(
            established.handle_frame(b""),
            Action::Terminate(Violation::Malformed(FrameError::MalformedLine))
        ));
    }

    #[test]
    fn closed_session_stays_closed() {
        let mut session = greeted();
        session.close();
        assert_eq!(session.handle_frame(b"HELLO\n"), Action::Terminate(Violation::Closed));
        assert!(session.is_closed());
    }
}
