//! LoRa uplink sink.
//!
//! Serializes the reading into the packed positional record and hands it
//! to the radio's outbound queue. The hand-off itself proves nothing:
//! the modem reports the real outcome later, and the main loop forwards
//! that [`TransmitEvent`] to the scheduler, which only then dequeues.

use log::info;

use crate::app::ports::{RadioPort, TransmitEvent};
use crate::reading::Reading;

use super::record::packed_record;
use super::{DeliveryStatus, Sink};

pub struct TransmitSink<R: RadioPort> {
    radio: R,
    wire_scale: f32,
}

impl<R: RadioPort> TransmitSink<R> {
    pub fn new(radio: R, wire_scale: f32) -> Self {
        Self { radio, wire_scale }
    }

    /// Forward the modem's completion event, if one is pending.
    pub fn poll_event(&mut self) -> Option<TransmitEvent> {
        self.radio.poll_event()
    }

    /// Access to the radio link (modem maintenance commands).
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

impl<R: RadioPort> Sink for TransmitSink<R> {
    fn deliver(&mut self, reading: &Reading) -> DeliveryStatus {
        let record = packed_record(reading, self.wire_scale);
        info!("deliver: submitting {} bytes to radio", record.len());
        self.radio.submit(record.as_bytes());
        DeliveryStatus::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockRadio {
        submitted: Vec<Vec<u8>>,
        pending_event: Option<TransmitEvent>,
    }

    impl RadioPort for MockRadio {
        fn submit(&mut self, payload: &[u8]) {
            self.submitted.push(payload.to_vec());
        }

        fn poll_event(&mut self) -> Option<TransmitEvent> {
            self.pending_event.take()
        }
    }

    #[test]
    fn deliver_submits_packed_payload_and_reports_submitted() {
        let radio = MockRadio {
            submitted: Vec::new(),
            pending_event: None,
        };
        let mut sink = TransmitSink::new(radio, 10.0);

        let mut reading = Reading::new(2);
        reading.climate.temperature_c = 22.4;
        let expected = packed_record(&reading, 10.0);

        assert_eq!(sink.deliver(&reading), DeliveryStatus::Submitted);
        assert_eq!(sink.radio.submitted.len(), 1);
        assert_eq!(sink.radio.submitted[0], expected.as_bytes());
    }

    #[test]
    fn poll_event_drains_the_pending_completion() {
        let radio = MockRadio {
            submitted: Vec::new(),
            pending_event: Some(TransmitEvent::Acked),
        };
        let mut sink = TransmitSink::new(radio, 10.0);

        assert_eq!(sink.poll_event(), Some(TransmitEvent::Acked));
        assert_eq!(sink.poll_event(), None);
    }
}
