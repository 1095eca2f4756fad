//! Observers that turn game notifications into display state
//!
//! Each view subscribes to the notifications it cares about and keeps only
//! its own state. Views never reference each other; the renderer reads them
//! once per frame.

use crate::game::{ClientGameProxy, Notification, NotificationKind};
use crate::network::Transport;
use shared::{AnswerOutcome, Cell, MaskedWord};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

pub const ALPHABET: std::ops::RangeInclusive<char> = 'A'..='Z';

pub trait Observer {
    fn interests(&self) -> &'static [NotificationKind];
    fn notify(&mut self, notification: &Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionsState {
    #[default]
    Idle,
    Playing,
    Finished,
}

/// The new game / restart button
#[derive(Debug, Default)]
pub struct OptionsControl {
    pub state: OptionsState,
}

impl OptionsControl {
    pub fn label(&self) -> &'static str {
        match self.state {
            OptionsState::Idle => "Start game",
            OptionsState::Playing => "Restart",
            OptionsState::Finished => "Play again",
        }
    }
}

impl Observer for OptionsControl {
    fn interests(&self) -> &'static [NotificationKind] {
        &[NotificationKind::GameStarted, NotificationKind::GuessChecked]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { .. } => self.state = OptionsState::Playing,
            Notification::GuessChecked { win, lost, .. } if *win || *lost => {
                self.state = OptionsState::Finished
            }
            _ => {}
        }
    }
}

#[derive(Debug, Default)]
pub struct WordDisplay {
    pub cells: Vec<Cell>,
}

impl WordDisplay {
    /// Masked word with a space between cells, e.g. `F _ _ _ _ _`
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.as_char().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn compact(&self) -> String {
        MaskedWord(&self.cells).to_string()
    }
}

impl Observer for WordDisplay {
    fn interests(&self) -> &'static [NotificationKind] {
        &[NotificationKind::GameStarted, NotificationKind::GuessChecked]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { word, .. } => self.cells = word.clone(),
            Notification::GuessChecked {
                word,
                correct: true,
                ..
            } => self.cells = word.clone(),
            _ => {}
        }
    }
}

/// Letter buttons
///
/// Correct letters are disabled, missed letters stay clickable and are only
/// highlighted.
#[derive(Debug, Default)]
pub struct AlphabetPanel {
    pub disabled: BTreeSet<char>,
    pub missed: BTreeSet<char>,
}

impl AlphabetPanel {
    pub fn is_enabled(&self, letter: char) -> bool {
        !self.disabled.contains(&letter.to_ascii_uppercase())
    }

    pub fn is_missed(&self, letter: char) -> bool {
        self.missed.contains(&letter.to_ascii_uppercase())
    }
}

impl Observer for AlphabetPanel {
    fn interests(&self) -> &'static [NotificationKind] {
        &[NotificationKind::GameStarted, NotificationKind::GuessChecked]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { .. } => {
                self.disabled.clear();
                self.missed.clear();
            }
            Notification::GuessChecked { guess, correct, .. } => {
                if *correct {
                    self.disabled.insert(*guess);
                } else {
                    self.missed.insert(*guess);
                }
            }
            _ => {}
        }
    }
}

/// The gallows drawing, one stage per incorrect guess
#[derive(Debug)]
pub struct ProgressIllustration {
    pub stage: u32,
    pub threshold: u32,
}

impl Default for ProgressIllustration {
    fn default() -> Self {
        Self {
            stage: 0,
            threshold: shared::INCORRECT_GUESS_THRESHOLD,
        }
    }
}

impl Observer for ProgressIllustration {
    fn interests(&self) -> &'static [NotificationKind] {
        &[NotificationKind::GameStarted, NotificationKind::GuessChecked]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { threshold, .. } => {
                self.stage = 0;
                self.threshold = *threshold;
            }
            Notification::GuessChecked {
                correct: false,
                incorrect_guesses,
                threshold,
                ..
            } => {
                self.stage = (*incorrect_guesses).min(*threshold);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerContent {
    Answer(String),
    Message(String),
}

#[derive(Debug, Default)]
pub struct AnswerPanel {
    pub visible: bool,
    pub reveal_offered: bool,
    pub content: Option<AnswerContent>,
}

impl Observer for AnswerPanel {
    fn interests(&self) -> &'static [NotificationKind] {
        &[
            NotificationKind::GameStarted,
            NotificationKind::GuessChecked,
            NotificationKind::AnswerFetched,
        ]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { .. } => {
                self.visible = false;
                self.reveal_offered = false;
                self.content = None;
            }
            Notification::GuessChecked {
                incorrect_guesses,
                threshold,
                ..
            } if incorrect_guesses >= threshold => {
                self.visible = true;
                self.reveal_offered = true;
            }
            Notification::AnswerFetched(outcome) => {
                self.visible = true;
                self.content = Some(match outcome {
                    AnswerOutcome::Success { answer } => {
                        self.reveal_offered = false;
                        AnswerContent::Answer(answer.clone())
                    }
                    AnswerOutcome::Failure { message, .. } => AnswerContent::Message(message.clone()),
                });
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
}

/// Win or loss announcement
#[derive(Debug, Default)]
pub struct ResultBanner {
    pub current: Option<GameResult>,
    /// Number of times a result has been announced
    pub announcements: u32,
}

impl Observer for ResultBanner {
    fn interests(&self) -> &'static [NotificationKind] {
        &[NotificationKind::GameStarted, NotificationKind::GuessChecked]
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::GameStarted { .. } => self.current = None,
            Notification::GuessChecked {
                win,
                incorrect_guesses,
                threshold,
                ..
            } => {
                let result = if *win {
                    Some(GameResult::Won)
                } else if incorrect_guesses >= threshold {
                    Some(GameResult::Lost)
                } else {
                    None
                };
                if let Some(result) = result {
                    self.current = Some(result);
                    self.announcements += 1;
                }
            }
            _ => {}
        }
    }
}

/// Every view of the game screen, each subscribed on its own
pub struct ViewSet {
    pub options: Rc<RefCell<OptionsControl>>,
    pub word: Rc<RefCell<WordDisplay>>,
    pub alphabet: Rc<RefCell<AlphabetPanel>>,
    pub progress: Rc<RefCell<ProgressIllustration>>,
    pub answer: Rc<RefCell<AnswerPanel>>,
    pub banner: Rc<RefCell<ResultBanner>>,
}

impl ViewSet {
    pub fn attach<T: Transport>(proxy: &ClientGameProxy<T>) -> Self {
        let views = Self {
            options: Rc::default(),
            word: Rc::default(),
            alphabet: Rc::default(),
            progress: Rc::default(),
            answer: Rc::default(),
            banner: Rc::default(),
        };

        register(proxy, &views.options);
        register(proxy, &views.word);
        register(proxy, &views.alphabet);
        register(proxy, &views.progress);
        register(proxy, &views.answer);
        register(proxy, &views.banner);

        views
    }
}

fn register<T: Transport, O: Observer + 'static>(proxy: &ClientGameProxy<T>, view: &Rc<RefCell<O>>) {
    let interests = view.borrow().interests();
    for kind in interests {
        let view = Rc::clone(view);
        proxy.subscribe(*kind, move |notification| {
            view.borrow_mut().notify(notification)
        });
    }
}
