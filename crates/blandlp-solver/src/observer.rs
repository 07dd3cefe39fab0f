/// Which phase of the two-phase method a pivot belongs to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Driving the auxiliary variable out to find a feasible basis
    One,
    /// Optimizing the original objective
    Two,
}

/// A single basis change.
///
/// Indices refer to the working columns of the phase: during phase one the
/// auxiliary variable is column 0 and every other column is shifted by one.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotEvent {
    pub phase: Phase,
    pub entering: usize,
    pub leaving: usize,
}

/// Receives every pivot the solver performs. Observers cannot influence the
/// solve.
pub trait PivotObserver {
    fn on_pivot(&mut self, event: PivotEvent);
}

/// Discards all events.
impl PivotObserver for () {
    fn on_pivot(&mut self, _event: PivotEvent) {}
}

impl<F: FnMut(PivotEvent)> PivotObserver for F {
    fn on_pivot(&mut self, event: PivotEvent) {
        self(event)
    }
}

/// Collects events in order.
impl PivotObserver for Vec<PivotEvent> {
    fn on_pivot(&mut self, event: PivotEvent) {
        self.push(event);
    }
}
