// Lookahead timer - Polls the scheduler from its own thread
//
// The render loop stops ticking while the window is hidden; the click track
// must not. The thread wakes several times per lookahead interval and calls
// `PracticeSession::poll`, which only runs a pass when the scheduler's timer
// is due on the audio clock.

use super::PracticeSession;
use crate::audio::timing::Clock;
use crate::sequencer::scheduler::{ClickSink, SchedulerTiming};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Session shared by the lookahead timer and the render loop
pub type SharedSession<C, S> = Arc<Mutex<PracticeSession<C, S>>>;

/// Wake-ups per lookahead interval
const WAKES_PER_INTERVAL: f64 = 4.0;

pub struct LookaheadTimer {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LookaheadTimer {
    /// Start polling `session` until the timer is stopped or dropped
    pub fn spawn<C, S>(session: SharedSession<C, S>) -> io::Result<Self>
    where
        C: Clock + Send + 'static,
        S: ClickSink + Send + 'static,
    {
        let interval = session
            .lock()
            .map(|session| session.scheduler().timing().lookahead_interval)
            .unwrap_or(SchedulerTiming::default().lookahead_interval);
        let wake = Duration::from_secs_f64(interval / WAKES_PER_INTERVAL);

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("lookahead-timer".to_string())
            .spawn(move || {
                while thread_running.load(Ordering::Acquire) {
                    match session.lock() {
                        Ok(mut session) => {
                            session.poll();
                        }
                        Err(_) => {
                            log::error!("Practice session poisoned, lookahead timer exiting");
                            break;
                        }
                    }
                    thread::sleep(wake);
                }
            })?;

        log::debug!("Lookahead timer started, waking every {:?}", wake);
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Lookahead timer thread panicked");
            }
        }
    }
}

impl Drop for LookaheadTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
