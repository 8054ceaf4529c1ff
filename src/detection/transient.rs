use crate::signal_processing::{Crossing, Edge};

/// A transient found by the `TransientFinder`, in input sample indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transient {
    pub start: usize,
    pub length: usize,
}

impl Transient {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No transient in progress
    Down,
    /// Transient in progress since `start`
    Up,
    /// Ratio fell before the minimum length; waiting to see whether the
    /// transient resumes or ends
    Holding,
}

/// Turns a stream of threshold crossings into transients
///
/// Every transient is between `min_length` and `max_length` samples long. A
/// transient that would exceed `max_length` is cut at `max_length`, and a new
/// one starts at the next rise beyond it. A transient whose ratio falls
/// early is held until either a later fall or a late enough rise ends it at
/// exactly `min_length`.
pub struct TransientFinder {
    min_length: usize,
    max_length: usize,
    state: State,
    start: usize,
}

impl TransientFinder {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        debug_assert!(min_length <= max_length);
        Self {
            min_length,
            max_length,
            state: State::Down,
            start: 0,
        }
    }

    /// Consume crossings in index order, returning the completed transients
    pub fn process(&mut self, crossings: &[Crossing]) -> Vec<Transient> {
        let mut transients = Vec::new();
        for crossing in crossings {
            self.step(crossing, &mut transients);
        }
        transients
    }

    /// Flush a transient still open when the stream ends at `end_index`
    pub fn complete(&mut self, end_index: usize) -> Vec<Transient> {
        self.process(&[Crossing::fall(end_index)])
    }

    fn step(&mut self, crossing: &Crossing, transients: &mut Vec<Transient>) {
        let index = crossing.index;
        let start = self.start;

        match (self.state, crossing.edge) {
            (State::Down, Edge::Rise) => {
                self.start = index;
                self.state = State::Up;
            }

            (State::Down, Edge::Fall) => {}

            (State::Up, Edge::Rise) => {
                let limit = start + self.max_length;
                if index == limit {
                    // A rise landing exactly on the maximum length ends the
                    // transient without starting another.
                    transients.push(Transient::new(start, self.max_length));
                    self.state = State::Down;
                } else if index > limit {
                    transients.push(Transient::new(start, self.max_length));
                    self.start = index;
                }
            }

            (State::Up, Edge::Fall) => {
                if index < start + self.min_length {
                    self.state = State::Holding;
                } else {
                    let length = (index - start).min(self.max_length);
                    transients.push(Transient::new(start, length));
                    self.state = State::Down;
                }
            }

            (State::Holding, Edge::Rise) => {
                if index > start + self.min_length {
                    transients.push(Transient::new(start, self.min_length));
                    self.start = index;
                }
                self.state = State::Up;
            }

            (State::Holding, Edge::Fall) => {
                if index >= start + self.min_length {
                    transients.push(Transient::new(start, self.min_length));
                    self.state = State::Down;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: usize = 100;
    const MAX: usize = 400;

    fn new_finder() -> TransientFinder {
        TransientFinder::new(MIN, MAX)
    }

    fn run(crossings: &[Crossing]) -> Vec<Transient> {
        new_finder().process(crossings)
    }

    #[test]
    fn test_down_rise_starts_transient() {
        let mut finder = new_finder();
        assert!(finder.process(&[Crossing::rise(1000)]).is_empty());
        assert_eq!(finder.state, State::Up);
        assert_eq!(finder.start, 1000);
    }

    #[test]
    fn test_down_fall_ignored() {
        let mut finder = new_finder();
        assert!(finder.process(&[Crossing::fall(1000)]).is_empty());
        assert_eq!(finder.state, State::Down);
    }

    #[test]
    fn test_up_rise_exactly_at_max_returns_down() {
        let mut finder = new_finder();
        let transients = finder.process(&[Crossing::rise(1000), Crossing::rise(1000 + MAX)]);
        assert_eq!(transients, vec![Transient::new(1000, MAX)]);
        assert_eq!(finder.state, State::Down);
    }

    #[test]
    fn test_up_rise_past_max_restarts() {
        let mut finder = new_finder();
        let transients =
            finder.process(&[Crossing::rise(1000), Crossing::rise(1000 + MAX + 1)]);
        assert_eq!(transients, vec![Transient::new(1000, MAX)]);
        assert_eq!(finder.state, State::Up);
        assert_eq!(finder.start, 1000 + MAX + 1);
    }

    #[test]
    fn test_up_rise_before_max_ignored() {
        let mut finder = new_finder();
        let transients = finder.process(&[Crossing::rise(1000), Crossing::rise(1000 + MAX - 1)]);
        assert!(transients.is_empty());
        assert_eq!(finder.state, State::Up);
        assert_eq!(finder.start, 1000);
    }

    #[test]
    fn test_up_fall_before_min_holds() {
        let mut finder = new_finder();
        let transients = finder.process(&[Crossing::rise(1000), Crossing::fall(1000 + MIN - 1)]);
        assert!(transients.is_empty());
        assert_eq!(finder.state, State::Holding);
    }

    #[test]
    fn test_up_fall_emits_measured_length() {
        assert_eq!(
            run(&[Crossing::rise(1000), Crossing::fall(1250)]),
            vec![Transient::new(1000, 250)]
        );
        assert_eq!(
            run(&[Crossing::rise(1000), Crossing::fall(1000 + MIN)]),
            vec![Transient::new(1000, MIN)]
        );
        assert_eq!(
            run(&[Crossing::rise(1000), Crossing::fall(1000 + 3 * MAX)]),
            vec![Transient::new(1000, MAX)]
        );
    }

    #[test]
    fn test_holding_rise() {
        // Late rise: emit the held transient and start a new one.
        let mut finder = new_finder();
        let transients = finder.process(&[
            Crossing::rise(1000),
            Crossing::fall(1050),
            Crossing::rise(1000 + MIN + 1),
        ]);
        assert_eq!(transients, vec![Transient::new(1000, MIN)]);
        assert_eq!(finder.state, State::Up);
        assert_eq!(finder.start, 1000 + MIN + 1);

        // Early rise: resume the held transient.
        let mut finder = new_finder();
        let transients = finder.process(&[
            Crossing::rise(1000),
            Crossing::fall(1050),
            Crossing::rise(1000 + MIN),
        ]);
        assert!(transients.is_empty());
        assert_eq!(finder.state, State::Up);
        assert_eq!(finder.start, 1000);
    }

    #[test]
    fn test_holding_fall() {
        let mut finder = new_finder();
        let transients = finder.process(&[
            Crossing::rise(1000),
            Crossing::fall(1050),
            Crossing::fall(1060),
        ]);
        assert!(transients.is_empty());
        assert_eq!(finder.state, State::Holding);

        let transients = finder.process(&[Crossing::fall(1000 + MIN)]);
        assert_eq!(transients, vec![Transient::new(1000, MIN)]);
        assert_eq!(finder.state, State::Down);
    }

    #[test]
    fn test_maximal_transient_splits_into_three() {
        let s = 5000;
        let transients = run(&[
            Crossing::rise(s),
            Crossing::rise(s + MAX + 1),
            Crossing::rise(s + 2 * (MAX + 1)),
            Crossing::fall(s + 3 * (MAX + 1)),
        ]);
        assert_eq!(
            transients,
            vec![
                Transient::new(s, MAX),
                Transient::new(s + MAX + 1, MAX),
                Transient::new(s + 2 * (MAX + 1), MAX),
            ]
        );
    }

    #[test]
    fn test_continuously_high_ratio_yields_one_maximal_transient() {
        let transients = run(&[Crossing::rise(0), Crossing::fall(10 * MAX)]);
        assert_eq!(transients, vec![Transient::new(0, MAX)]);
    }

    #[test]
    fn test_minimal_transient_suppression() {
        let mut finder = new_finder();
        let mut transients = finder.process(&[Crossing::rise(2000), Crossing::fall(2010)]);
        transients.extend(finder.complete(2000 + 2 * MIN));
        assert_eq!(transients, vec![Transient::new(2000, MIN)]);
        assert_eq!(finder.state, State::Down);
    }

    #[test]
    fn test_complete_flushes_open_transient() {
        let mut finder = new_finder();
        assert!(finder.process(&[Crossing::rise(100)]).is_empty());
        assert_eq!(finder.complete(300), vec![Transient::new(100, 200)]);
        assert!(finder.complete(400).is_empty());
    }

    #[test]
    fn test_complete_while_holding_too_early() {
        let mut finder = new_finder();
        finder.process(&[Crossing::rise(100), Crossing::fall(120)]);
        assert!(finder.complete(150).is_empty());
    }
}
