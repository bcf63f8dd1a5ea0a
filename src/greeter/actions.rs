//! Request/response operations of the Greeter object.
//!
//! Each [`GreeterAction`] is answered by the [`GreeterActionResult`] variant of the
//! same name. [`GreeterClient`](crate::clients::GreeterClient) hides the pairing.

#[derive(Debug, Clone)]
pub enum GreeterAction {
    /// Read the greeting template (`"Hello"` if never set).
    GetGreeting,
    /// Read the name (`"World"` if never set). Presence flavor only.
    GetName,
    /// Persist a new greeting, then broadcast.
    SetGreeting(String),
    /// Persist a new name, then broadcast. Presence flavor only.
    SetName(String),
    /// Compose `"<greeting>, <name>!"`, using the persisted name when `None`.
    SayHello(Option<String>),
    /// Push the connection count, adjusted by `delta`, to every connection.
    BroadcastUsers(i64),
    /// Push the current greeting to every connection.
    BroadcastHello,
}

/// Results from GreeterActions - variants match 1:1 with GreeterAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreeterActionResult {
    GetGreeting(String),
    GetName(String),
    SetGreeting(()),
    SetName(()),
    SayHello(String),
    /// The count that was announced.
    BroadcastUsers(usize),
    /// How many connections received it.
    BroadcastHello(usize),
}

/// Work the greeter schedules on its own timer queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreeterTask {
    /// Recount after a disconnect has settled.
    BroadcastUsers,
}
