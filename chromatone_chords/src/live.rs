// Live chord tracking on a dedicated thread.
//
// MIDI input callbacks run on driver threads and must not block on chord
// analysis. `LiveTracker::spawn` moves a `ChordTracker` onto its own thread;
// producers send `TrackerCommand`s over an mpsc channel and readers poll the
// latest `ChordState` snapshot, which the tracker thread republishes after
// every command that changes it. Commands from all producers are applied in
// the order the channel receives them, so the tracker itself stays
// single-threaded.
//
// Shutdown: `stop()` clears the `keep_running` flag, queues a `Stop` command
// and joins the thread, which returns the tracker to the caller. Commands
// queued before `stop()` are drained first; anything a producer sends after
// the `Stop` is never applied, so a busy producer cannot hold the thread
// open. The loop also uses `recv_timeout` to notice the flag while idle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use chromatone_theory::PitchClassSet;

use crate::tracker::{ChordState, ChordTracker};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: i32,
    pub pressed: bool,
}

#[derive(Debug)]
pub enum TrackerCommand {
    Note(NoteEvent),
    SetRoot { note: i32, scale: PitchClassSet },
    Clear,
    /// Reply once every earlier command has been applied.
    Sync(Sender<()>),
    /// End the tracker thread. Sent by `LiveTracker::stop` and on drop.
    Stop,
}

#[derive(Debug, thiserror::Error)]
pub enum LiveTrackerError {
    #[error("tracker thread is no longer running")]
    Stopped,
}

/// Cloneable sending side, for handing to MIDI input callbacks.
#[derive(Debug, Clone)]
pub struct TrackerSender {
    tx: Sender<TrackerCommand>,
}

impl TrackerSender {
    pub fn send(&self, command: TrackerCommand) -> Result<(), LiveTrackerError> {
        self.tx.send(command).map_err(|_| LiveTrackerError::Stopped)
    }

    pub fn note_event(&self, note: i32, pressed: bool) -> Result<(), LiveTrackerError> {
        self.send(TrackerCommand::Note(NoteEvent { note, pressed }))
    }
}

pub struct LiveTracker {
    sender: TrackerSender,
    snapshot: Arc<Mutex<ChordState>>,
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<ChordTracker>>,
}

impl LiveTracker {
    pub fn spawn(tracker: ChordTracker) -> Self {
        let (tx, rx) = mpsc::channel::<TrackerCommand>();
        let snapshot = Arc::new(Mutex::new(tracker.chord_state()));
        let keep_running = Arc::new(AtomicBool::new(true));

        let snapshot_clone = snapshot.clone();
        let keep_running_clone = keep_running.clone();
        let thread = thread::spawn(move || {
            let mut tracker = tracker;
            loop {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(TrackerCommand::Stop) => break,
                    Ok(command) => apply(&mut tracker, command, &snapshot_clone),
                    Err(RecvTimeoutError::Timeout) => {
                        if !keep_running_clone.load(Ordering::SeqCst) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("live tracker thread exiting");
            tracker
        });

        LiveTracker {
            sender: TrackerSender { tx },
            snapshot,
            keep_running,
            thread: Some(thread),
        }
    }

    pub fn sender(&self) -> TrackerSender {
        self.sender.clone()
    }

    pub fn note_event(&self, note: i32, pressed: bool) -> Result<(), LiveTrackerError> {
        self.sender.note_event(note, pressed)
    }

    pub fn set_root(&self, note: i32, scale: PitchClassSet) -> Result<(), LiveTrackerError> {
        self.sender.send(TrackerCommand::SetRoot { note, scale })
    }

    /// Block until every command sent so far has been applied.
    pub fn sync(&self) -> Result<(), LiveTrackerError> {
        let (tx, rx) = mpsc::channel();
        self.sender.send(TrackerCommand::Sync(tx))?;
        rx.recv().map_err(|_| LiveTrackerError::Stopped)
    }

    /// Latest published chord state.
    pub fn snapshot(&self) -> ChordState {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop the thread and take the tracker back.
    pub fn stop(mut self) -> Result<ChordTracker, LiveTrackerError> {
        self.keep_running.store(false, Ordering::SeqCst);
        let _ = self.sender.send(TrackerCommand::Stop);
        let handle = self.thread.take().ok_or(LiveTrackerError::Stopped)?;
        handle.join().map_err(|_| LiveTrackerError::Stopped)
    }
}

impl Drop for LiveTracker {
    fn drop(&mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if self.thread.is_some() {
            let _ = self.sender.send(TrackerCommand::Stop);
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn apply(tracker: &mut ChordTracker, command: TrackerCommand, snapshot: &Mutex<ChordState>) {
    let changed = match command {
        TrackerCommand::Note(event) => tracker.note_event(event.note, event.pressed),
        TrackerCommand::SetRoot { note, scale } => {
            tracker.set_root(note, scale);
            true
        }
        TrackerCommand::Clear => tracker.clear(),
        TrackerCommand::Sync(reply) => {
            let _ = reply.send(());
            false
        }
        TrackerCommand::Stop => false,
    };
    if changed {
        let state = tracker.chord_state();
        *snapshot.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;

    #[test]
    fn test_events_reach_snapshot() {
        let live = LiveTracker::spawn(ChordTracker::new(&TrackerConfig::default()));
        for note in [57, 60, 64] {
            live.note_event(note, true).unwrap();
        }
        live.sync().unwrap();
        let state = live.snapshot();
        assert_eq!(state.chord_name, Some("Minor Triad"));
        assert_eq!(state.reference_note, Some(9));

        let tracker = live.stop().unwrap();
        assert_eq!(tracker.pitch_class_set(), 1 << 9 | 1 | 1 << 4);
    }

    #[test]
    fn test_senders_from_other_threads() {
        let live = LiveTracker::spawn(ChordTracker::default());
        let handles: Vec<_> = [60, 64, 67]
            .into_iter()
            .map(|note| {
                let sender = live.sender();
                thread::spawn(move || sender.note_event(note, true))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        live.sync().unwrap();
        assert_eq!(live.snapshot().chord_name, Some("Major Triad"));
    }

    #[test]
    fn test_set_root_goes_through_queue() {
        let live = LiveTracker::spawn(ChordTracker::default());
        live.set_root(57, 0b1010_1011_0101).unwrap();
        let tracker = live.stop().unwrap();
        assert_eq!(tracker.tonal_root(), 9);
    }

    #[test]
    fn test_stop_returns_while_producer_is_busy() {
        let live = LiveTracker::spawn(ChordTracker::default());
        let sender = live.sender();
        let producer = thread::spawn(move || {
            let mut sent = 0u64;
            // Runs until the tracker thread is gone.
            while sender.note_event(60, sent % 2 == 0).is_ok() {
                sent += 1;
                thread::yield_now();
            }
            sent
        });
        thread::sleep(Duration::from_millis(50));
        let tracker = live.stop().unwrap();
        assert!(tracker.press_count(0) <= 1);
        assert!(producer.join().unwrap() > 0);
    }

    #[test]
    fn test_drop_with_busy_producer_does_not_hang() {
        let live = LiveTracker::spawn(ChordTracker::default());
        let sender = live.sender();
        let producer = thread::spawn(move || {
            while sender.note_event(64, true).is_ok() && sender.note_event(64, false).is_ok() {
                thread::yield_now();
            }
        });
        thread::sleep(Duration::from_millis(50));
        drop(live);
        producer.join().unwrap();
    }

    #[test]
    fn test_send_after_stop_fails() {
        let live = LiveTracker::spawn(ChordTracker::default());
        let sender = live.sender();
        live.stop().unwrap();
        assert!(matches!(
            sender.note_event(60, true),
            Err(LiveTrackerError::Stopped)
        ));
    }
}
