use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    config::Config,
    models::{RankedResultSet, RecommendationItem},
    store::ResultStore,
};

/// How much of a ranked result set is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// There is no result set to reveal
    Empty,
    /// The first `n` items are visible
    Revealing(usize),
    /// Every item is visible
    Complete,
}

impl RevealState {
    /// State a freshly mounted view starts in
    pub fn initial(total: Option<usize>) -> Self {
        match total {
            None => RevealState::Empty,
            Some(0) => RevealState::Complete,
            Some(_) => RevealState::Revealing(0),
        }
    }

    /// The state after this one; terminal states stay put
    pub fn advance(self, total: usize) -> Self {
        match self {
            RevealState::Revealing(n) if n < total => RevealState::Revealing(n + 1),
            RevealState::Revealing(_) => RevealState::Complete,
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RevealState::Empty | RevealState::Complete)
    }

    /// Whether moving on from this state waits for a tick
    pub fn awaits_tick(self, total: usize) -> bool {
        matches!(self, RevealState::Revealing(n) if n < total)
    }

    pub fn visible_count(self, total: usize) -> usize {
        match self {
            RevealState::Empty => 0,
            RevealState::Revealing(n) => n.min(total),
            RevealState::Complete => total,
        }
    }
}

/// Plays a ranked result set back one item per tick
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    interval: Duration,
}

struct Shared {
    state: RevealState,
    torn_down: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

impl RevealScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reveal_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mounts a reveal over whatever the store holds right now
    pub async fn mount(&self, store: &ResultStore) -> RevealHandle {
        self.mount_set(store.take().await)
    }

    /// Mounts a reveal over `set`; must run inside a Tokio runtime
    pub fn mount_set(&self, set: Option<RankedResultSet>) -> RevealHandle {
        let initial = RevealState::initial(set.as_ref().map(RankedResultSet::len));
        let results = Arc::new(set.unwrap_or_default());
        let shared = Arc::new(Mutex::new(Shared {
            state: initial,
            torn_down: false,
        }));
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::info!(items = results.len(), state = ?initial, "Reveal mounted");

        let task = if initial.is_terminal() {
            None
        } else {
            let shared = shared.clone();
            let total = results.len();
            let interval = self.interval;
            Some(tokio::spawn(async move {
                run_reveal(shared, total, interval, tx).await;
            }))
        };

        RevealHandle {
            results,
            shared,
            transitions: rx,
            task,
        }
    }
}

/// Steps are strictly sequential: the next sleep starts only after the previous commit
async fn run_reveal(
    shared: Arc<Mutex<Shared>>,
    total: usize,
    interval: Duration,
    tx: mpsc::UnboundedSender<RevealState>,
) {
    loop {
        let current = lock(&shared).state;
        if current.is_terminal() {
            break;
        }
        if current.awaits_tick(total) {
            tokio::time::sleep(interval).await;
        }
        if !commit(&shared, &tx, current.advance(total)) {
            break;
        }
    }
}

fn commit(
    shared: &Mutex<Shared>,
    tx: &mpsc::UnboundedSender<RevealState>,
    next: RevealState,
) -> bool {
    let mut guard = lock(shared);
    if guard.torn_down {
        return false;
    }
    guard.state = next;
    // The view may have stopped listening; the state itself is still committed
    let _ = tx.send(next);
    tracing::debug!(state = ?next, "Reveal advanced");
    true
}

/// A mounted reveal; tearing it down (or dropping it) stops it for good
pub struct RevealHandle {
    results: Arc<RankedResultSet>,
    shared: Arc<Mutex<Shared>>,
    transitions: mpsc::UnboundedReceiver<RevealState>,
    task: Option<JoinHandle<()>>,
}

impl RevealHandle {
    pub fn state(&self) -> RevealState {
        lock(&self.shared).state
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn visible_count(&self) -> usize {
        self.state().visible_count(self.total())
    }

    /// The items currently shown, best match first
    pub fn visible_items(&self) -> &[RecommendationItem] {
        &self.results.items()[..self.visible_count()]
    }

    pub fn results(&self) -> &RankedResultSet {
        &self.results
    }

    /// Waits for the next committed transition
    ///
    /// Returns `None` once the reveal has finished or has been torn down.
    pub async fn next_transition(&mut self) -> Option<RevealState> {
        self.transitions.recv().await
    }

    pub fn is_torn_down(&self) -> bool {
        lock(&self.shared).torn_down
    }

    /// Cancels the pending step; no state change happens after this returns
    pub fn teardown(&mut self) {
        {
            let mut guard = lock(&self.shared);
            if guard.torn_down {
                return;
            }
            guard.torn_down = true;
            tracing::info!(state = ?guard.state, "Reveal torn down");
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.transitions.close();
        while self.transitions.try_recv().is_ok() {}
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    const TICK: Duration = Duration::from_millis(800);

    fn result_set(n: usize) -> RankedResultSet {
        (0..n)
            .map(|i| RecommendationItem::new(format!("Film {i}")))
            .collect::<Vec<_>>()
            .into()
    }

    /// Drains the handle, recording each transition with the time it landed
    async fn collect(handle: &mut RevealHandle) -> Vec<(RevealState, Duration)> {
        let start = Instant::now();
        let mut seen = Vec::new();
        while let Some(state) = handle.next_transition().await {
            seen.push((state, start.elapsed()));
        }
        seen
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(RevealState::initial(None), RevealState::Empty);
        assert_eq!(RevealState::initial(Some(0)), RevealState::Complete);
        assert_eq!(RevealState::initial(Some(4)), RevealState::Revealing(0));
    }

    #[test]
    fn test_advance() {
        assert_eq!(RevealState::Revealing(0).advance(2), RevealState::Revealing(1));
        assert_eq!(RevealState::Revealing(1).advance(2), RevealState::Revealing(2));
        assert_eq!(RevealState::Revealing(2).advance(2), RevealState::Complete);
        assert_eq!(RevealState::Complete.advance(2), RevealState::Complete);
        assert_eq!(RevealState::Empty.advance(2), RevealState::Empty);
    }

    #[test]
    fn test_only_partial_reveals_await_a_tick() {
        assert!(RevealState::Revealing(0).awaits_tick(1));
        assert!(!RevealState::Revealing(1).awaits_tick(1));
        assert!(!RevealState::Complete.awaits_tick(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_set_completes_immediately() {
        let mut handle = RevealScheduler::default().mount_set(Some(result_set(0)));
        assert_eq!(handle.state(), RevealState::Complete);
        assert!(collect(&mut handle).await.is_empty());
        assert_eq!(handle.visible_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_set_is_empty() {
        let mut handle = RevealScheduler::default().mount_set(None);
        assert_eq!(handle.state(), RevealState::Empty);
        assert!(handle.next_transition().await.is_none());
        assert!(handle.visible_items().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_item_takes_one_step() {
        let mut handle = RevealScheduler::default().mount_set(Some(result_set(1)));
        assert_eq!(handle.state(), RevealState::Revealing(0));

        assert_eq!(
            collect(&mut handle).await,
            vec![
                (RevealState::Revealing(1), TICK),
                (RevealState::Complete, TICK),
            ]
        );
        assert_eq!(handle.visible_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_item_per_tick_at_constant_cadence() {
        let mut handle = RevealScheduler::default().mount_set(Some(result_set(4)));

        let seen = collect(&mut handle).await;
        assert_eq!(
            seen,
            vec![
                (RevealState::Revealing(1), TICK),
                (RevealState::Revealing(2), TICK * 2),
                (RevealState::Revealing(3), TICK * 3),
                (RevealState::Revealing(4), TICK * 4),
                (RevealState::Complete, TICK * 4),
            ]
        );
        assert_eq!(handle.state(), RevealState::Complete);
        assert_eq!(handle.visible_items().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_items_follow_the_state() {
        let scheduler = RevealScheduler::new(Duration::from_millis(50));
        let mut handle = scheduler.mount_set(Some(result_set(3)));
        assert!(handle.visible_items().is_empty());

        assert_eq!(handle.next_transition().await, Some(RevealState::Revealing(1)));
        assert_eq!(handle.visible_items()[0].title, "Film 0");

        assert_eq!(handle.next_transition().await, Some(RevealState::Revealing(2)));
        let titles: Vec<_> = handle.visible_items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Film 0", "Film 1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_step() {
        let mut handle = RevealScheduler::default().mount_set(Some(result_set(5)));
        assert_eq!(handle.next_transition().await, Some(RevealState::Revealing(1)));
        assert_eq!(handle.next_transition().await, Some(RevealState::Revealing(2)));

        handle.teardown();
        assert!(handle.is_torn_down());

        tokio::time::sleep(TICK * 10).await;
        assert_eq!(handle.state(), RevealState::Revealing(2));
        assert_eq!(handle.next_transition().await, None);

        handle.teardown();
        assert_eq!(handle.state(), RevealState::Revealing(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_handle_tears_down() {
        let handle = RevealScheduler::default().mount_set(Some(result_set(3)));
        let shared = handle.shared.clone();
        drop(handle);

        assert!(lock(&shared).torn_down);
        tokio::time::sleep(TICK * 10).await;
        assert_eq!(lock(&shared).state, RevealState::Revealing(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_reads_the_store() {
        let store = ResultStore::new();
        store.put(&result_set(2)).await;

        let mut handle = RevealScheduler::default().mount(&store).await;
        assert_eq!(handle.total(), 2);
        let states: Vec<_> = collect(&mut handle).await.into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            states,
            vec![
                RevealState::Revealing(1),
                RevealState::Revealing(2),
                RevealState::Complete
            ]
        );
        assert_eq!(store.take().await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_on_empty_store() {
        let store = ResultStore::new();
        let handle = RevealScheduler::default().mount(&store).await;
        assert_eq!(handle.state(), RevealState::Empty);
    }
}
