// UI module - rendering layer
//
// Observes StateManager events and turns them into user-visible output.
// Holds no business logic.

pub mod console;
pub mod dialogs;

pub use console::ConsoleView;
