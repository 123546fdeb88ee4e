use crate::graph::{host::AudioHost, node::NodeId};

/*
Scheduled ADSR Envelope
=======================

The envelope is not computed sample by sample in the control path. Instead
the whole curve is written ahead of time as automation on the voice's gain
node, stamped with audio-clock times. The renderer then follows it with
sample accuracy no matter when the scheduling call actually ran.

The Shape: Exponential Ramps
----------------------------

  Gain
  peak ┐    ╭╮
       │   ╱  ╲
   S   │  │    ╰─────────────╮
       │  │                   ╲
 floor └──┘                    ╲──→ Time
       t  t+A  t+A+D     stop  stop+R
         Attack Decay  Sustain  Release

Ramps are multiplicative: each equal slice of time multiplies the gain by
the same factor. That matches how loudness is heard, and it is why the
curve starts and ends at a tiny `floor` instead of zero: an exponential
ramp can never reach or start from 0.

Onset (note start at audio time t)
----------------------------------

    set   floor            at t
    ramp  peak             by t + attack
    ramp  sustain · peak   by t + attack + decay
    (hold until release)

Release (note stop at audio time t)
-----------------------------------

    v = gain value at t          (wherever the curve currently is)
    cancel everything at/after t (drops the pending attack/decay ramps)
    set   v                      at t
    ramp  floor                  by t + release
    stop oscillator              at t + release + stop_margin

Capturing `v` first matters when a key is released during the attack or
decay: the release glides down from the real current level instead of
jumping to the sustain level. The stop margin lets the ramp finish before
the oscillator is cut, so there is no click at the end.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Seconds from floor to peak.
    pub attack: f64,
    /// Seconds from peak to the sustain level.
    pub decay: f64,
    /// Sustain level as a fraction of `peak`.
    pub sustain: f32,
    /// Seconds from the current level back to floor.
    pub release: f64,
    pub peak: f32,
    /// Smallest gain used; stands in for silence.
    pub floor: f32,
    /// Extra time after the release before the oscillator stops.
    pub stop_margin: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.12,
            sustain: 0.6,
            release: 0.3,
            peak: 1.0,
            floor: 0.0001,
            stop_margin: 0.05,
        }
    }
}

impl Envelope {
    pub fn sustain_level(&self) -> f32 {
        (self.sustain * self.peak).max(self.floor)
    }

    /// Time from a stop request until the voice is silent and stopped.
    pub fn tail(&self) -> f64 {
        self.release + self.stop_margin
    }

    /// Write the attack and decay ramps onto `gain`, starting at `now`.
    pub fn schedule_onset<H: AudioHost + ?Sized>(&self, host: &mut H, gain: NodeId, now: f64) {
        let peak_at = now + self.attack;
        host.set_gain_at(gain, self.floor, now);
        host.exponential_ramp_gain_to(gain, self.peak, peak_at);
        host.exponential_ramp_gain_to(gain, self.sustain_level(), peak_at + self.decay);
    }

    /// Replace whatever is left of the curve with a release from the current
    /// level, and stop `oscillator` once it has faded. Returns the stop time.
    pub fn schedule_release<H: AudioHost + ?Sized>(
        &self,
        host: &mut H,
        gain: NodeId,
        oscillator: NodeId,
        now: f64,
    ) -> f64 {
        let current = host
            .gain_at(gain, now)
            .unwrap_or(self.floor)
            .max(self.floor);

        host.cancel_gain_from(gain, now);
        host.set_gain_at(gain, current, now);
        host.exponential_ramp_gain_to(gain, self.floor, now + self.release);

        let stop_at = now + self.tail();
        host.stop_oscillator(oscillator, stop_at);
        stop_at
    }
}
