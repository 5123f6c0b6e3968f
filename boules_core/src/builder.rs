use std::sync::Arc;

use boules_traits::Actuator;
use boules_traits::clock::{Clock, MonotonicClock};

use crate::config::ThrowParams;
use crate::error::Result;
use crate::mapping::DistanceMap;
use crate::sequencer::ThrowSequencer;
use crate::status::ThrowPhase;

// ── Type-state markers ───────────────────────────────────────────────────────

/// Placeholder for a builder slot that has not been filled yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct Missing;

/// Builder for `ThrowSequencer`.
///
/// The slots are type parameters: `L` and `T` become the actuator types once
/// `with_lift`/`with_trigger` are called and `M` becomes `Arc<DistanceMap>`
/// after `with_map`. `build()` only exists when all three are filled.
pub struct ThrowSequencerBuilder<L, T, M> {
    lift: L,
    trigger: T,
    map: M,
    params: Option<ThrowParams>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl Default for ThrowSequencerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            lift: Missing,
            trigger: Missing,
            map: Missing,
            params: None,
            clock: None,
        }
    }
}

impl ThrowSequencerBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Chainable setters that do not affect type-state.
impl<L, T, M> ThrowSequencerBuilder<L, T, M> {
    pub fn with_params(mut self, params: ThrowParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<T, M> ThrowSequencerBuilder<Missing, T, M> {
    pub fn with_lift<A: Actuator>(self, lift: A) -> ThrowSequencerBuilder<A, T, M> {
        ThrowSequencerBuilder {
            lift,
            trigger: self.trigger,
            map: self.map,
            params: self.params,
            clock: self.clock,
        }
    }
}

impl<L, M> ThrowSequencerBuilder<L, Missing, M> {
    pub fn with_trigger<A: Actuator>(self, trigger: A) -> ThrowSequencerBuilder<L, A, M> {
        ThrowSequencerBuilder {
            lift: self.lift,
            trigger,
            map: self.map,
            params: self.params,
            clock: self.clock,
        }
    }
}

impl<L, T> ThrowSequencerBuilder<L, T, Missing> {
    pub fn with_map(
        self,
        map: impl Into<Arc<DistanceMap>>,
    ) -> ThrowSequencerBuilder<L, T, Arc<DistanceMap>> {
        ThrowSequencerBuilder {
            lift: self.lift,
            trigger: self.trigger,
            map: map.into(),
            params: self.params,
            clock: self.clock,
        }
    }
}

impl<L: Actuator, T: Actuator> ThrowSequencerBuilder<L, T, Arc<DistanceMap>> {
    /// Validate the throw parameters and build the sequencer.
    pub fn build(self) -> Result<ThrowSequencer<L, T>> {
        let params = self.params.unwrap_or_default();
        params.validate().map_err(eyre::Report::new)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        tracing::debug!(
            start_cm = self.map.start(),
            end_cm = self.map.end(),
            ramp_deg = params.ramp_rotation_deg,
            "throw sequencer built"
        );
        Ok(ThrowSequencer {
            lift: self.lift,
            trigger: self.trigger,
            map: self.map,
            params,
            clock,
            phase: ThrowPhase::Idle,
            armed: None,
            started_at: None,
            fault: None,
            throws: 0,
        })
    }
}
