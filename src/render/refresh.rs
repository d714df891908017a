/// Handle for one run of the live-stroke refresh loop.
///
/// The host schedules a repeating task per token (one call per display refresh) and stops
/// scheduling as soon as a tick reports the token is no longer live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoopToken(u64);

impl LoopToken {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Drawing(LoopToken),
}

/// Idle/Drawing state machine driving per-tick live renders.
#[derive(Debug, Default)]
pub struct RefreshLoop {
    state: LoopState,
    issued: u64,
    ticks: u64,
}

impl RefreshLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Enter Drawing with a fresh token. Any previous token stops being live.
    pub fn start(&mut self) -> LoopToken {
        self.issued += 1;
        let token = LoopToken(self.issued);
        if let LoopState::Drawing(old) = self.state {
            tracing::debug!(old = old.0, new = token.0, "refresh loop restarted");
        }
        self.state = LoopState::Drawing(token);
        token
    }

    /// Back to Idle. Returns the token that was cancelled, if any.
    pub fn cancel(&mut self) -> Option<LoopToken> {
        match std::mem::take(&mut self.state) {
            LoopState::Drawing(token) => Some(token),
            LoopState::Idle => None,
        }
    }

    pub fn is_live(&self, token: LoopToken) -> bool {
        self.state == LoopState::Drawing(token)
    }

    /// Account one refresh tick. Returns whether the tick should render.
    pub fn tick(&mut self, token: LoopToken) -> bool {
        if !self.is_live(token) {
            return false;
        }
        self.ticks += 1;
        true
    }

    /// Ticks that rendered since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/refresh.rs"]
mod tests;
