/// Events emitted during a simulation step.
/// The host consumes these for sound, routing and the audio registry.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenCause {
    /// The player walked into the zone.
    Entered,
    /// `enter` on the overlapped zone.
    Manual,
    /// Deep link or history navigation.
    Route,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ZoneOpened { zone: usize, cause: OpenCause },
    ZoneClosed { zone: usize },
    StaminaDepleted,
    StaminaRecovered,
    ZoomChanged(f32),
    MinimapToggled(bool),
}
