/*
Parameter Automation
====================

An `AudioParam` is a value that changes over time according to a list of
time-stamped events, in the style of the Web Audio API. Scheduling against
the audio clock (rather than setting values when a callback happens to run)
is what makes envelopes sample-accurate.

Events
------

  SetValue { value, time }          jump to `value` at `time`
  ExponentialRamp { value, time }   glide from the previous event's value,
                                    reaching `value` exactly at `time`

Evaluating at time t
--------------------

  1. No event at or before t:
       - the next event is a ramp → ramp from the default value starting at 0
       - otherwise              → the default value
  2. Last event at or before t is E, the following event is a ramp R:
       v(t) = E.value · (R.value / E.value) ^ ((t - E.time) / (R.time - E.time))
  3. Otherwise → E.value

Exponential ramps cannot touch zero (log(0)) or cross it. When either end
is non-positive, or the two ends have opposite signs, the ramp holds its
start value until the ramp time and then jumps. Envelopes therefore use a
small positive floor instead of silence.

Pruning
-------

Once time has passed an event, everything before the event that anchors the
current segment can be dropped. `prune_before` keeps the event list short
for long-lived params such as the master gain.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { value: f32, time: f64 },
    ExponentialRamp { value: f32, time: f64 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } | ParamEvent::ExponentialRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            ParamEvent::SetValue { value, .. } | ParamEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioParam {
    default_value: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    /// Jump to `value` at `time`.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent::SetValue { value, time });
    }

    /// Glide exponentially from the previous event's value to `value` at `time`.
    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent::ExponentialRamp { value, time });
    }

    /// Remove every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|e| e.time() < time);
    }

    /// Drop events that no longer influence values at or after `time`.
    pub fn prune_before(&mut self, time: f64) {
        let anchor = self.events.iter().rposition(|e| e.time() <= time);
        if let Some(idx) = anchor {
            if idx > 0 {
                self.events.drain(..idx);
            }
        }
    }

    /// Value of the param at `time` (seconds on the audio clock).
    pub fn value_at(&self, time: f64) -> f32 {
        let next_idx = self.events.partition_point(|e| e.time() <= time);

        let (start_value, start_time) = match next_idx.checked_sub(1) {
            Some(idx) => (self.events[idx].value(), self.events[idx].time()),
            None => (self.default_value, 0.0),
        };

        match self.events.get(next_idx) {
            Some(&ParamEvent::ExponentialRamp { value, time: end_time }) => {
                exponential_between(start_value, start_time, value, end_time, time)
            }
            _ => start_value,
        }
    }

    fn insert(&mut self, event: ParamEvent) {
        // Events at the same time keep insertion order
        let idx = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(idx, event);
    }
}

fn exponential_between(v0: f32, t0: f64, v1: f32, t1: f64, t: f64) -> f32 {
    if v0 <= 0.0 || v1 <= 0.0 {
        // Covers zero endpoints and opposite signs alike
        return v0;
    }
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let progress = ((t - t0) / span).clamp(0.0, 1.0);
    (f64::from(v0) * (f64::from(v1) / f64::from(v0)).powf(progress)) as f32
}
