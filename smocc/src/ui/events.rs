/// Requests from the UI to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    StartGame,
    ToggleDebugPanel,
}
