use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::anim::scheduler::{Scheduler, TimerToken};

/// Delay before a non-matching pair is turned face-down again.
pub const MISMATCH_HIDE_DELAY: Duration = Duration::from_millis(800);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug)]
pub struct Card {
    pub value: String,
    pub state: CardState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Revealed(usize),
    PairMatched(usize, usize),
    PairHidden(usize, usize),
    Won,
}

struct GameState {
    cards: Vec<Card>,
    flipped: Vec<usize>,
    pending_hide: Option<TimerToken>,
    observer: Option<Box<dyn FnMut(GameEvent)>>,
}

/// Card-matching engine. Reveals are discrete events; the revert of a
/// non-matching pair is a one-shot delay on the shared scheduler.
#[derive(Clone)]
pub struct MatchGame {
    scheduler: Scheduler,
    state: Rc<RefCell<GameState>>,
}

impl MatchGame {
    /// Builds a game whose deck holds each value exactly twice, shuffled.
    pub fn with_pairs(scheduler: Scheduler, values: &[&str]) -> Self {
        let game = MatchGame {
            scheduler,
            state: Rc::new(RefCell::new(GameState {
                cards: Vec::new(),
                flipped: Vec::new(),
                pending_hide: None,
                observer: None,
            })),
        };
        game.reset(values);
        game
    }

    /// Starts a fresh round: cancels any pending revert and deals a new
    /// shuffled deck with the pairing invariant intact.
    pub fn reset(&self, values: &[&str]) {
        use rand::seq::SliceRandom;

        let mut deck: Vec<&str> = values.iter().chain(values.iter()).copied().collect();
        let mut rng = rand::rng();
        deck.shuffle(&mut rng);

        let mut state = self.state.borrow_mut();
        if let Some(token) = state.pending_hide.take() {
            self.scheduler.cancel(token);
        }
        state.flipped.clear();
        state.cards = deck
            .into_iter()
            .map(|value| Card {
                value: value.to_string(),
                state: CardState::Hidden,
            })
            .collect();
    }

    pub fn set_observer(&self, observer: impl FnMut(GameEvent) + 'static) {
        self.state.borrow_mut().observer = Some(Box::new(observer));
    }

    pub fn card(&self, index: usize) -> Option<Card> {
        self.state.borrow().cards.get(index).cloned()
    }

    pub fn card_count(&self) -> usize {
        self.state.borrow().cards.len()
    }

    pub fn is_won(&self) -> bool {
        let state = self.state.borrow();
        !state.cards.is_empty()
            && state.cards.iter().all(|card| card.state == CardState::Matched)
    }

    /// Turns one card face-up. No-op while a two-card resolution is
    /// pending, for already revealed or matched cards, and for indices
    /// outside the grid.
    pub fn reveal(&self, index: usize) {
        let mut events = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            let Some(card) = state.cards.get(index) else {
                return;
            };
            // A full flipped list must resolve before any further reveal.
            if state.flipped.len() == 2 || card.state != CardState::Hidden {
                return;
            }

            state.cards[index].state = CardState::Flipped;
            state.flipped.push(index);
            events.push(GameEvent::Revealed(index));

            if state.flipped.len() == 2 {
                let (first, second) = (state.flipped[0], state.flipped[1]);
                if state.cards[first].value == state.cards[second].value {
                    state.cards[first].state = CardState::Matched;
                    state.cards[second].state = CardState::Matched;
                    state.flipped.clear();
                    events.push(GameEvent::PairMatched(first, second));
                    if state.cards.iter().all(|card| card.state == CardState::Matched) {
                        events.push(GameEvent::Won);
                    }
                } else {
                    let game = self.clone();
                    let token = self
                        .scheduler
                        .after(MISMATCH_HIDE_DELAY, move || game.hide_pending());
                    state.pending_hide = Some(token);
                }
            }
        }
        self.emit(events);
    }

    fn hide_pending(&self) {
        let mut events = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            state.pending_hide = None;
            if let [first, second] = state.flipped[..] {
                state.cards[first].state = CardState::Hidden;
                state.cards[second].state = CardState::Hidden;
                events.push(GameEvent::PairHidden(first, second));
            }
            state.flipped.clear();
        }
        self.emit(events);
    }

    fn emit(&self, events: Vec<GameEvent>) {
        if events.is_empty() {
            return;
        }
        // The observer is taken out for the duration of the calls so it
        // may borrow the game itself.
        let mut observer = self.state.borrow_mut().observer.take();
        if let Some(callback) = observer.as_mut() {
            for event in events {
                callback(event);
            }
        }
        let mut state = self.state.borrow_mut();
        if state.observer.is_none() {
            state.observer = observer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::scheduler::TICK_PERIOD;

    const HIDE_TICKS: usize = 50; // 800 ms at 16 ms per tick

    fn game_with_known_layout(values: &[&str]) -> (Scheduler, MatchGame, Rc<RefCell<Vec<GameEvent>>>) {
        let scheduler = Scheduler::new(TICK_PERIOD);
        let game = MatchGame::with_pairs(scheduler.clone(), values);
        // Force a deterministic layout: A A B B ...
        {
            let mut state = game.state.borrow_mut();
            let mut sorted: Vec<String> =
                state.cards.iter().map(|card| card.value.clone()).collect();
            sorted.sort();
            for (card, value) in state.cards.iter_mut().zip(sorted) {
                card.value = value;
            }
        }
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        game.set_observer(move |event| sink.borrow_mut().push(event));
        (scheduler, game, events)
    }

    fn states(game: &MatchGame) -> Vec<CardState> {
        (0..game.card_count())
            .map(|i| game.card(i).unwrap().state)
            .collect()
    }

    #[test]
    fn deck_holds_each_value_exactly_twice() {
        let scheduler = Scheduler::new(TICK_PERIOD);
        let game = MatchGame::with_pairs(scheduler, &["a", "b", "c"]);
        assert_eq!(game.card_count(), 6);
        for value in ["a", "b", "c"] {
            let count = (0..6)
                .filter(|&i| game.card(i).unwrap().value == value)
                .count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn matching_pair_resolves_synchronously() {
        let (_scheduler, game, events) = game_with_known_layout(&["a", "b"]);
        game.reveal(0);
        game.reveal(1);
        assert_eq!(states(&game)[..2], [CardState::Matched, CardState::Matched]);
        assert_eq!(game.state.borrow().flipped.len(), 0);
        assert_eq!(
            *events.borrow(),
            vec![
                GameEvent::Revealed(0),
                GameEvent::Revealed(1),
                GameEvent::PairMatched(0, 1),
            ]
        );
    }

    #[test]
    fn winning_the_last_pair_emits_won() {
        let (_scheduler, game, events) = game_with_known_layout(&["a", "b"]);
        game.reveal(0);
        game.reveal(1);
        game.reveal(2);
        game.reveal(3);
        assert!(game.is_won());
        assert_eq!(events.borrow().last(), Some(&GameEvent::Won));
    }

    #[test]
    fn mismatch_reverts_after_the_delay() {
        let (scheduler, game, events) = game_with_known_layout(&["a", "b"]);
        game.reveal(0);
        game.reveal(2);
        assert_eq!(states(&game)[0], CardState::Flipped);
        assert_eq!(states(&game)[2], CardState::Flipped);

        for _ in 0..HIDE_TICKS - 1 {
            scheduler.tick();
        }
        assert_eq!(states(&game)[0], CardState::Flipped);
        scheduler.tick();
        assert_eq!(states(&game)[0], CardState::Hidden);
        assert_eq!(states(&game)[2], CardState::Hidden);
        assert_eq!(game.state.borrow().flipped.len(), 0);
        assert_eq!(events.borrow().last(), Some(&GameEvent::PairHidden(0, 2)));
    }

    #[test]
    fn reveals_are_rejected_while_a_pair_is_pending() {
        let (scheduler, game, events) = game_with_known_layout(&["a", "b"]);
        game.reveal(0);
        game.reveal(2);
        let before = states(&game);

        // Neither a pending card nor a fresh one may flip now.
        game.reveal(0);
        game.reveal(3);
        assert_eq!(states(&game), before);
        assert_eq!(events.borrow().len(), 2);

        for _ in 0..HIDE_TICKS {
            scheduler.tick();
        }
        // After resolution the rejected card flips normally.
        game.reveal(3);
        assert_eq!(states(&game)[3], CardState::Flipped);
    }

    #[test]
    fn out_of_range_and_repeated_reveals_are_no_ops() {
        let (_scheduler, game, events) = game_with_known_layout(&["a", "b"]);
        game.reveal(99);
        game.reveal(0);
        game.reveal(0);
        assert_eq!(events.borrow().len(), 1);
        game.reveal(1);
        // Matched cards cannot be revealed again.
        game.reveal(0);
        assert_eq!(events.borrow().last(), Some(&GameEvent::PairMatched(0, 1)));
    }

    #[test]
    fn reset_cancels_a_pending_revert() {
        let (scheduler, game, _events) = game_with_known_layout(&["a", "b"]);
        game.reveal(0);
        game.reveal(2);
        game.reset(&["a", "b"]);
        for _ in 0..HIDE_TICKS {
            scheduler.tick();
        }
        // The stale revert must not corrupt the fresh round.
        assert!(states(&game).iter().all(|&s| s == CardState::Hidden));
    }
}
