//! Client-side stand-in for the server's game session
//!
//! `ClientGameProxy` issues the three game operations over a `Transport`,
//! keeps a small mirror of the server's verdicts and broadcasts exactly one
//! `Notification` per successful operation. Views never talk to the network
//! directly; they only react to these notifications.

use crate::network::{Transport, TransportError};
use log::{debug, info};
use shared::{AnswerOutcome, Cell, RejectReason, Request, Response, INCORRECT_GUESS_THRESHOLD};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{message}")]
    Rejected {
        reason: RejectReason,
        message: String,
    },
    #[error("unexpected response to {operation}: {response:?}")]
    UnexpectedResponse {
        operation: &'static str,
        response: Response,
    },
    #[error("the game is over, start a new game")]
    GameOver,
    #[error("the answer is only available once the game is lost")]
    AnswerLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    GameStarted,
    GuessChecked,
    AnswerFetched,
}

/// Broadcast after an operation completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    GameStarted {
        word: Vec<Cell>,
        threshold: u32,
    },
    GuessChecked {
        guess: char,
        word: Vec<Cell>,
        correct: bool,
        incorrect_guesses: u32,
        win: bool,
        lost: bool,
        repeated: bool,
        threshold: u32,
    },
    AnswerFetched(AnswerOutcome),
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::GameStarted { .. } => NotificationKind::GameStarted,
            Notification::GuessChecked { .. } => NotificationKind::GuessChecked,
            Notification::AnswerFetched(_) => NotificationKind::AnswerFetched,
        }
    }
}

/// What the client last heard from the server about the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    pub win: bool,
    pub lost: bool,
    pub last_guessed: Option<char>,
    pub threshold: u32,
    pub incorrect_guesses: u32,
}

impl Mirror {
    pub fn new() -> Self {
        Self {
            win: false,
            lost: false,
            last_guessed: None,
            threshold: INCORRECT_GUESS_THRESHOLD,
            incorrect_guesses: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.win || self.lost
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new()
    }
}

type Callback = Box<dyn FnMut(&Notification)>;

struct Subscriber {
    kind: NotificationKind,
    callback: Callback,
}

#[derive(Default)]
struct Subscribers {
    entries: Vec<Subscriber>,
}

impl Subscribers {
    fn publish(&mut self, notification: &Notification) {
        let kind = notification.kind();
        for subscriber in self.entries.iter_mut().filter(|s| s.kind == kind) {
            (subscriber.callback)(notification);
        }
    }
}

/// Handle to the game on the server
///
/// Clones share the transport, the mirror and the subscriber list, so a
/// clone can be moved into a spawned task while the UI keeps its own.
pub struct ClientGameProxy<T> {
    transport: Rc<T>,
    mirror: Rc<RefCell<Mirror>>,
    subscribers: Rc<RefCell<Subscribers>>,
}

impl<T> Clone for ClientGameProxy<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Rc::clone(&self.transport),
            mirror: Rc::clone(&self.mirror),
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: Transport> ClientGameProxy<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Rc::new(transport),
            mirror: Rc::new(RefCell::new(Mirror::new())),
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn mirror(&self) -> Mirror {
        *self.mirror.borrow()
    }

    /// Registers `callback` for one kind of notification.
    ///
    /// Callbacks run synchronously in registration order and must not
    /// subscribe further callbacks themselves.
    pub fn subscribe(&self, kind: NotificationKind, callback: impl FnMut(&Notification) + 'static) {
        self.subscribers.borrow_mut().entries.push(Subscriber {
            kind,
            callback: Box::new(callback),
        });
    }

    pub async fn start(&self) -> Result<(), ClientError> {
        let response = self.transport.request(Request::StartGame).await?;

        match response {
            Response::GameStarted { word } => {
                let threshold = {
                    let mut mirror = self.mirror.borrow_mut();
                    *mirror = Mirror::new();
                    mirror.threshold
                };
                info!("New game started ({} letters)", word.len());
                self.publish(Notification::GameStarted { word, threshold });
                Ok(())
            }
            other => Err(unexpected("start", other)),
        }
    }

    pub async fn check(&self, guess: char) -> Result<(), ClientError> {
        if self.mirror.borrow().is_over() {
            debug!("Ignoring guess {:?}, the game is over", guess);
            return Err(ClientError::GameOver);
        }

        let response = self
            .transport
            .request(Request::CheckGuess {
                char_clicked: guess,
            })
            .await?;

        match response {
            Response::GuessChecked {
                word,
                correct_guess,
                incorrect_guesses,
                win,
                lost,
                repeated,
            } => {
                let guess = guess.to_ascii_uppercase();
                let threshold = {
                    let mut mirror = self.mirror.borrow_mut();
                    mirror.win = win;
                    mirror.lost = lost;
                    mirror.last_guessed = Some(guess);
                    mirror.incorrect_guesses = incorrect_guesses;
                    mirror.threshold
                };
                debug!(
                    "Guess {:?}: correct={} incorrect={} repeated={}",
                    guess, correct_guess, incorrect_guesses, repeated
                );
                self.publish(Notification::GuessChecked {
                    guess,
                    word,
                    correct: correct_guess,
                    incorrect_guesses,
                    win,
                    lost,
                    repeated,
                    threshold,
                });
                Ok(())
            }
            other => Err(unexpected("check", other)),
        }
    }

    pub async fn get_answer(&self) -> Result<(), ClientError> {
        if !self.mirror.borrow().lost {
            return Err(ClientError::AnswerLocked);
        }

        let response = self.transport.request(Request::RevealAnswer).await?;

        match response {
            Response::AnswerFetched(outcome) => {
                self.publish(Notification::AnswerFetched(outcome));
                Ok(())
            }
            other => Err(unexpected("get_answer", other)),
        }
    }

    fn publish(&self, notification: Notification) {
        self.subscribers.borrow_mut().publish(&notification);
    }
}

fn unexpected(operation: &'static str, response: Response) -> ClientError {
    match response {
        Response::Rejected { reason, message } => ClientError::Rejected { reason, message },
        response => ClientError::UnexpectedResponse {
            operation,
            response,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio_test::{assert_err, assert_ok, block_on};

    /// Replays canned responses and records every request it was given
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub responses: RefCell<VecDeque<Result<Response, TransportError>>>,
        pub requests: RefCell<Vec<Request>>,
    }

    impl ScriptedTransport {
        pub fn with(responses: Vec<Result<Response, TransportError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        async fn request(&self, request: Request) -> Result<Response, TransportError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(TransportError::Closed))
        }
    }

    pub(crate) fn hidden(len: usize) -> Vec<Cell> {
        vec![Cell::Hidden; len]
    }

    pub(crate) fn checked(incorrect_guesses: u32, correct: bool, win: bool, lost: bool) -> Response {
        Response::GuessChecked {
            word: hidden(6),
            correct_guess: correct,
            incorrect_guesses,
            win,
            lost,
            repeated: false,
        }
    }

    fn recorder<T: Transport>(proxy: &ClientGameProxy<T>) -> Rc<RefCell<Vec<Notification>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            NotificationKind::GameStarted,
            NotificationKind::GuessChecked,
            NotificationKind::AnswerFetched,
        ] {
            let seen = Rc::clone(&seen);
            proxy.subscribe(kind, move |n| seen.borrow_mut().push(n.clone()));
        }
        seen
    }

    #[test]
    fn test_start_emits_game_started() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(
            Response::GameStarted { word: hidden(6) },
        )]));
        let seen = recorder(&proxy);

        assert_ok!(block_on(proxy.start()));

        assert_eq!(
            *seen.borrow(),
            vec![Notification::GameStarted {
                word: hidden(6),
                threshold: INCORRECT_GUESS_THRESHOLD
            }]
        );
        assert_eq!(proxy.mirror(), Mirror::new());
    }

    #[test]
    fn test_check_updates_mirror() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(checked(
            1, false, false, false,
        ))]));
        let seen = recorder(&proxy);

        assert_ok!(block_on(proxy.check('z')));

        let mirror = proxy.mirror();
        assert_eq!(mirror.last_guessed, Some('Z'));
        assert_eq!(mirror.incorrect_guesses, 1);
        assert!(!mirror.is_over());

        match &seen.borrow()[0] {
            Notification::GuessChecked { guess, correct, .. } => {
                assert_eq!(*guess, 'Z');
                assert!(!correct);
            }
            other => panic!("Unexpected notification: {:?}", other),
        }
        assert_eq!(
            *proxy.transport().requests.borrow(),
            vec![Request::CheckGuess { char_clicked: 'z' }]
        );
    }

    #[test]
    fn test_check_refused_locally_after_loss() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(checked(
            6, false, false, true,
        ))]));
        assert_ok!(block_on(proxy.check('Q')));
        let seen = recorder(&proxy);

        let result = block_on(proxy.check('E'));
        assert!(matches!(result, Err(ClientError::GameOver)));
        assert!(seen.borrow().is_empty());
        assert_eq!(proxy.transport().requests.borrow().len(), 1);
    }

    #[test]
    fn test_check_refused_locally_after_win() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(checked(
            0, true, true, false,
        ))]));
        assert_ok!(block_on(proxy.check('A')));

        assert!(matches!(block_on(proxy.check('B')), Err(ClientError::GameOver)));
        assert_eq!(proxy.transport().requests.borrow().len(), 1);
    }

    #[test]
    fn test_answer_locked_until_lost() {
        let proxy = ClientGameProxy::new(ScriptedTransport::default());

        let result = block_on(proxy.get_answer());
        assert!(matches!(result, Err(ClientError::AnswerLocked)));
        assert!(proxy.transport().requests.borrow().is_empty());
    }

    #[test]
    fn test_answer_after_loss() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![
            Ok(checked(6, false, false, true)),
            Ok(Response::AnswerFetched(AnswerOutcome::Success {
                answer: "FRANCE".to_string(),
            })),
        ]));
        let seen = recorder(&proxy);

        assert_ok!(block_on(proxy.check('Z')));
        assert_ok!(block_on(proxy.get_answer()));

        assert_eq!(
            seen.borrow().last(),
            Some(&Notification::AnswerFetched(AnswerOutcome::Success {
                answer: "FRANCE".to_string()
            }))
        );
    }

    #[test]
    fn test_rejection_is_verbatim_and_silent() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(Response::Rejected {
            reason: RejectReason::NoGame,
            message: "No game in progress, start a new game first".to_string(),
        })]));
        let seen = recorder(&proxy);

        let error = assert_err!(block_on(proxy.check('A')));
        assert_eq!(error.to_string(), "No game in progress, start a new game first");
        assert!(matches!(
            error,
            ClientError::Rejected {
                reason: RejectReason::NoGame,
                ..
            }
        ));
        assert!(seen.borrow().is_empty());
        assert_eq!(proxy.mirror(), Mirror::new());
    }

    #[test]
    fn test_transport_failure_leaves_state_untouched() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Err(
            TransportError::Timeout,
        )]));
        let seen = recorder(&proxy);

        let result = block_on(proxy.check('A'));
        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::Timeout))
        ));
        assert!(seen.borrow().is_empty());
        assert_eq!(proxy.mirror(), Mirror::new());
    }

    #[test]
    fn test_mismatched_response_is_rejected() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![Ok(
            Response::GameStarted { word: hidden(3) },
        )]));
        let seen = recorder(&proxy);

        let result = block_on(proxy.check('A'));
        assert!(matches!(
            result,
            Err(ClientError::UnexpectedResponse {
                operation: "check",
                ..
            })
        ));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_subscribers_filtered_by_kind_in_order() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![
            Ok(Response::GameStarted { word: hidden(2) }),
            Ok(checked(1, false, false, false)),
        ]));
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, kind) in [
            ("first", NotificationKind::GuessChecked),
            ("start", NotificationKind::GameStarted),
            ("second", NotificationKind::GuessChecked),
        ] {
            let order = Rc::clone(&order);
            proxy.subscribe(kind, move |_| order.borrow_mut().push(label));
        }

        assert_ok!(block_on(proxy.start()));
        assert_ok!(block_on(proxy.check('X')));

        assert_eq!(*order.borrow(), vec!["start", "first", "second"]);
    }

    #[test]
    fn test_restart_clears_mirror() {
        let proxy = ClientGameProxy::new(ScriptedTransport::with(vec![
            Ok(checked(6, false, false, true)),
            Ok(Response::GameStarted { word: hidden(4) }),
        ]));

        assert_ok!(block_on(proxy.check('Z')));
        assert!(proxy.mirror().lost);

        assert_ok!(block_on(proxy.start()));
        assert_eq!(proxy.mirror(), Mirror::new());
    }
}
