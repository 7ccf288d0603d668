// Communication channels lock-free
// Scheduled clicks travel from the control thread to the audio callback

use crate::sequencer::metronome::ClickEvent;
use crate::sequencer::scheduler::ClickSink;
use ringbuf::traits::Producer;
use ringbuf::{HeapRb, traits::Split};

pub type ClickProducer = ringbuf::HeapProd<ClickEvent>;
pub type ClickConsumer = ringbuf::HeapCons<ClickEvent>;

pub fn create_click_channel(capacity: usize) -> (ClickProducer, ClickConsumer) {
    let rb = HeapRb::<ClickEvent>::new(capacity);
    rb.split()
}

impl ClickSink for ClickProducer {
    fn schedule(&mut self, event: ClickEvent) {
        // try_push is not blocking; a full queue means the audio thread stalled
        if self.try_push(event).is_err() {
            log::warn!("Click queue full, click at {:.3}s dropped", event.time);
        }
    }
}
