//! Completion events posted back to the engine by acknowledgement tasks.

/// Outcome of one acknowledgement round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEvent {
    /// The endpoint answered and the artificial delay elapsed.
    Completed,

    /// The request never got a response.
    Failed {
        /// Error description.
        message: String,
    },
}

/// Sender half of the action event channel.
pub type ActionEventSender = tokio::sync::mpsc::UnboundedSender<ActionEvent>;

/// Receiver half of the action event channel.
pub type ActionEventReceiver = tokio::sync::mpsc::UnboundedReceiver<ActionEvent>;
