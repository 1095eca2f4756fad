//! The game screen: input, game operations and rendering in one frame loop

use crate::game::{ClientError, ClientGameProxy};
use crate::input::{InputManager, UiAction};
use crate::network::Transport;
use crate::rendering::Renderer;
use crate::tasks::LocalTasks;
use crate::views::ViewSet;
use log::{debug, info, warn};
use macroquad::prelude::next_frame;
use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::rc::Rc;

pub struct App<T: Transport + 'static> {
    proxy: ClientGameProxy<T>,
    views: ViewSet,
    tasks: LocalTasks,
    input: InputManager,
    renderer: Renderer,
    /// Last error worth showing to the player
    status: Rc<RefCell<Option<String>>>,
}

impl<T: Transport + 'static> App<T> {
    pub fn new(proxy: ClientGameProxy<T>, width: f32, height: f32) -> io::Result<Self> {
        let views = ViewSet::attach(&proxy);
        Ok(Self {
            proxy,
            views,
            tasks: LocalTasks::new()?,
            input: InputManager::new(),
            renderer: Renderer::new(width, height),
            status: Rc::new(RefCell::new(None)),
        })
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    /// Handles one player action without waiting for the server.
    ///
    /// Returns false when the player asked to quit.
    pub fn dispatch(&mut self, action: UiAction) -> bool {
        let proxy = self.proxy.clone();
        let status = Rc::clone(&self.status);

        match action {
            UiAction::NewGame => {
                self.tasks
                    .spawn(report(status, async move { proxy.start().await }));
            }
            UiAction::Guess(letter) => {
                if !self.views.alphabet.borrow().is_enabled(letter) {
                    debug!("{} was already revealed", letter);
                    return true;
                }
                self.tasks
                    .spawn(report(status, async move { proxy.check(letter).await }));
            }
            UiAction::RevealAnswer => {
                if !self.views.answer.borrow().reveal_offered {
                    return true;
                }
                self.tasks
                    .spawn(report(status, async move { proxy.get_answer().await }));
            }
            UiAction::Quit => return false,
        }

        true
    }

    /// Advances outstanding operations; notifications fire from here.
    pub fn poll(&mut self) -> usize {
        self.tasks.poll()
    }

    pub async fn run(&mut self) {
        info!("Controls: click or type letters to guess, Enter for a new game, Tab to reveal the answer, Esc to quit");

        loop {
            let layout = self.renderer.layout();
            let actions = self.input.update(&layout);
            if !actions.into_iter().all(|action| self.dispatch(action)) {
                break;
            }

            self.poll();

            let status = self.status.borrow().clone();
            self.renderer.render(&self.views, status.as_deref());

            next_frame().await;
        }

        info!("Leaving game");
    }
}

async fn report(
    status: Rc<RefCell<Option<String>>>,
    operation: impl Future<Output = Result<(), ClientError>>,
) {
    match operation.await {
        Ok(()) => *status.borrow_mut() = None,
        Err(ClientError::GameOver) | Err(ClientError::AnswerLocked) => {
            debug!("Action ignored in the current game state");
        }
        Err(e) => {
            warn!("{}", e);
            *status.borrow_mut() = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::{hidden, ScriptedTransport};
    use crate::network::TransportError;
    use shared::{Request, Response};

    fn app(responses: Vec<Result<Response, TransportError>>) -> App<ScriptedTransport> {
        App::new(
            ClientGameProxy::new(ScriptedTransport::with(responses)),
            800.0,
            600.0,
        )
        .unwrap()
    }

    #[test]
    fn test_actions_run_on_poll() {
        let mut app = app(vec![Ok(Response::GameStarted { word: hidden(6) })]);

        assert!(app.dispatch(UiAction::NewGame));
        assert!(app.views().word.borrow().cells.is_empty());

        assert_eq!(app.poll(), 0);
        assert_eq!(app.views().word.borrow().cells, hidden(6));
    }

    #[test]
    fn test_quit_stops_loop() {
        let mut app = app(Vec::new());
        assert!(!app.dispatch(UiAction::Quit));
    }

    #[test]
    fn test_reveal_needs_offer() {
        let mut app = app(Vec::new());

        assert!(app.dispatch(UiAction::RevealAnswer));
        assert_eq!(app.poll(), 0);
        assert!(app.proxy.transport().requests.borrow().is_empty());
    }

    #[test]
    fn test_errors_reach_status_line() {
        let mut app = app(vec![Err(TransportError::Timeout)]);

        app.dispatch(UiAction::Guess('E'));
        app.poll();

        assert_eq!(
            app.status.borrow().as_deref(),
            Some("the server did not answer in time")
        );
        assert_eq!(
            *app.proxy.transport().requests.borrow(),
            vec![Request::CheckGuess { char_clicked: 'E' }]
        );
    }
}
