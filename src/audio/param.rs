// Sample-accurate parameter automation.
//
// A parameter holds a current value and approaches a target exponentially.
// Targets are scheduled for a future sample ("set target at time"); a new
// note first cancels everything scheduled from its start time onward, then
// queues its own targets. Only a handful of events are ever pending, so they
// live in a fixed array and the audio callback never allocates.

const MAX_PENDING: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
struct TargetEvent {
    start: u64,  // sample index
    target: f32,
    coeff: f32,  // per-sample approach factor
}

#[derive(Clone, Debug)]
pub struct AutomatedParam {
    value: f32,
    target: f32,
    coeff: f32,
    pending: [Option<TargetEvent>; MAX_PENDING],
}

/// Per-sample factor for an exponential approach with time constant `tau`.
fn approach_coeff(tau_secs: f32, sample_rate: f32) -> f32 {
    let samples = tau_secs * sample_rate;
    if samples <= 1.0 {
        1.0
    } else {
        1.0 - (-1.0 / samples).exp()
    }
}

impl AutomatedParam {
    pub fn new(value: f32) -> Self {
        Self { value, target: value, coeff: 0.0, pending: [None; MAX_PENDING] }
    }

    #[cfg(test)]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Starting at sample `start`, move toward `target` with time constant
    /// `tau_secs`.
    pub fn set_target_at_time(&mut self, target: f32, start: u64, tau_secs: f32, sample_rate: f32) {
        let event = TargetEvent { start, target, coeff: approach_coeff(tau_secs, sample_rate) };
        // replace the latest-starting event when the queue is full
        let slot = match self.pending.iter().position(Option::is_none) {
            Some(free) => free,
            None => self.latest_pending().unwrap_or(MAX_PENDING - 1),
        };
        self.pending[slot] = Some(event);
    }

    /// Drops every event starting at or after `from`. A ramp already in
    /// progress keeps going.
    pub fn cancel_scheduled_values(&mut self, from: u64) {
        for slot in self.pending.iter_mut() {
            if matches!(slot, Some(e) if e.start >= from) {
                *slot = None;
            }
        }
    }

    /// Value at sample `now`, then advance one sample.
    pub fn next(&mut self, now: u64) -> f32 {
        while let Some(idx) = self.due_event(now) {
            if let Some(e) = self.pending[idx].take() {
                self.target = e.target;
                self.coeff = e.coeff;
            }
        }
        self.value += (self.target - self.value) * self.coeff;
        self.value
    }

    // earliest event whose start has passed
    fn due_event(&self, now: u64) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.filter(|e| e.start <= now).map(|e| (i, e.start)))
            .min_by_key(|&(_, start)| start)
            .map(|(i, _)| i)
    }

    fn latest_pending(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i, e.start)))
            .max_by_key(|&(_, start)| start)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1000.0;

    #[test]
    fn holds_until_event_starts() {
        let mut p = AutomatedParam::new(0.0);
        p.set_target_at_time(1.0, 10, 0.01, SR);
        for now in 0..10 {
            assert_eq!(p.next(now), 0.0);
        }
        assert!(p.next(10) > 0.0);
    }

    #[test]
    fn approaches_target_by_one_time_constant() {
        let mut p = AutomatedParam::new(0.0);
        p.set_target_at_time(1.0, 0, 0.1, SR); // tau = 100 samples
        let mut v = 0.0;
        for now in 0..100 {
            v = p.next(now);
        }
        // 1 - e^-1
        assert!((v - 0.632).abs() < 0.01, "{v}");
    }

    #[test]
    fn later_event_takes_over() {
        let mut p = AutomatedParam::new(0.0);
        p.set_target_at_time(1.0, 0, 0.001, SR);
        p.set_target_at_time(0.0, 5, 0.001, SR);
        for now in 0..5 {
            p.next(now);
        }
        assert!(p.value() > 0.9);
        for now in 5..20 {
            p.next(now);
        }
        assert!(p.value() < 0.01);
    }

    #[test]
    fn cancel_drops_future_events_only() {
        let mut p = AutomatedParam::new(0.0);
        p.set_target_at_time(1.0, 0, 0.001, SR);
        p.next(0);
        p.set_target_at_time(5.0, 50, 0.001, SR);
        p.cancel_scheduled_values(10);
        for now in 1..100 {
            p.next(now);
        }
        assert!((p.value() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn full_queue_replaces_latest() {
        let mut p = AutomatedParam::new(0.0);
        for i in 0..MAX_PENDING as u64 {
            p.set_target_at_time(i as f32, 10 + i, 0.0, SR);
        }
        p.set_target_at_time(9.0, 12, 0.0, SR);
        for now in 0..40 {
            p.next(now);
        }
        // the event at sample 13 was replaced, so the last one applied is 9.0 at 12
        assert_eq!(p.value(), 9.0);
    }
}
